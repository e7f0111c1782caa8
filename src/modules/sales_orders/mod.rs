pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{SalesOrder, SalesOrderStatus};
pub use repositories::{MySqlSalesOrderRepository, SalesOrderRepository};
pub use services::{QuotationConversion, SalesOrderService};
