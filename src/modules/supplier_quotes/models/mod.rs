pub mod supplier_quote;

pub use supplier_quote::{
    CreateSupplierQuoteRequest, SupplierQuote, SupplierQuoteDetail, SupplierQuoteStatus,
    SupplierQuoteStatusRequest, UpdateSupplierQuoteRequest,
};
