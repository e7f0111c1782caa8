pub mod stock_issue_service;

pub use stock_issue_service::StockIssueService;
