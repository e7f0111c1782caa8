pub mod stock_issue;

pub use stock_issue::{CreateStockIssueRequest, IssueStatus, StockIssue, StockIssueDetail};
