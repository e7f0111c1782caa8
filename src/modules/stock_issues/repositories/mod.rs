pub mod stock_issue_repository;

pub use stock_issue_repository::{MySqlStockIssueRepository, StockIssueRepository, ISSUE_LINES};
