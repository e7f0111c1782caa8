pub mod supplier_quote_controller;

pub use supplier_quote_controller::configure;
