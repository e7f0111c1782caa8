pub mod quotation;

pub use quotation::{
    CreateQuotationRequest, Quotation, QuotationDetail, QuotationStatus, QuotationStatusRequest,
    UpdateQuotationRequest,
};
