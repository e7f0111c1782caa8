pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{LpoStatus, SupplierLpo};
pub use repositories::{MySqlSupplierLpoRepository, SupplierLpoRepository, SUPPLIER_LPO_LINES};
pub use services::SupplierLpoService;
