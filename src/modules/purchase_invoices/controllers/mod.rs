pub mod purchase_invoice_controller;

pub use purchase_invoice_controller::configure;
