pub mod supplier_lpo_service;

pub use supplier_lpo_service::{LpoEmailOutcome, SupplierLpoService};
