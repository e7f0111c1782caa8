pub mod party_controller;

pub use party_controller::configure;
