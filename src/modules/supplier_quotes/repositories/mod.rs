pub mod supplier_quote_repository;

pub use supplier_quote_repository::{MySqlSupplierQuoteRepository, SupplierQuoteRepository};
