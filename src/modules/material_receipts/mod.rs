pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{MaterialReceipt, ReceiptStatus};
pub use repositories::{MaterialReceiptRepository, MySqlMaterialReceiptRepository};
pub use services::MaterialReceiptService;
