pub mod sales_order_service;

pub use sales_order_service::{QuotationConversion, SalesOrderService};
