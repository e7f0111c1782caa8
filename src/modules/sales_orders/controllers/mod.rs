pub mod sales_order_controller;

pub use sales_order_controller::configure;
