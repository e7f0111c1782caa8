pub mod material_receipt_controller;

pub use material_receipt_controller::configure;
