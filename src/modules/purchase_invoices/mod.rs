pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{PurchaseInvoice, PurchaseInvoiceStatus};
pub use repositories::{MySqlPurchaseInvoiceRepository, PurchaseInvoiceRepository};
pub use services::PurchaseInvoiceService;
