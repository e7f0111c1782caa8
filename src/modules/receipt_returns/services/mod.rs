pub mod receipt_return_service;

pub use receipt_return_service::{ensure_within_received, ReceiptReturnService};
