pub mod material_receipt_service;

pub use material_receipt_service::{ensure_within_ordered, MaterialReceiptService};
