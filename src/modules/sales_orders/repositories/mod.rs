pub mod sales_order_repository;

pub use sales_order_repository::{MySqlSalesOrderRepository, SalesOrderRepository};
