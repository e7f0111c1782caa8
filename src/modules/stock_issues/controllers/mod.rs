pub mod stock_issue_controller;

pub use stock_issue_controller::configure;
