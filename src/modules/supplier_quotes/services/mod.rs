pub mod supplier_quote_service;

pub use supplier_quote_service::{QuoteComparison, SupplierQuoteService};
