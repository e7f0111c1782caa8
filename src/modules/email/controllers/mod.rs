pub mod email_controller;

pub use email_controller::configure;
