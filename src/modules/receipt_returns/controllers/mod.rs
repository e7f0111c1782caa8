pub mod receipt_return_controller;

pub use receipt_return_controller::configure;
