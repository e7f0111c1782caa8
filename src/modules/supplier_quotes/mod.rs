pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{SupplierQuote, SupplierQuoteStatus};
pub use repositories::{MySqlSupplierQuoteRepository, SupplierQuoteRepository};
pub use services::SupplierQuoteService;
