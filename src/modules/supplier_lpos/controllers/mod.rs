pub mod supplier_lpo_controller;

pub use supplier_lpo_controller::configure;
