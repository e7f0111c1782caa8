pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{IssueStatus, StockIssue};
pub use repositories::{MySqlStockIssueRepository, StockIssueRepository};
pub use services::StockIssueService;
