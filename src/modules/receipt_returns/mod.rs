pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{ReceiptReturn, ReturnStatus};
pub use repositories::{MySqlReceiptReturnRepository, ReceiptReturnRepository};
pub use services::ReceiptReturnService;
