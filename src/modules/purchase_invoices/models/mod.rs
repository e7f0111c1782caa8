pub mod purchase_invoice;

pub use purchase_invoice::{
    CreatePurchaseInvoiceRequest, PurchaseInvoice, PurchaseInvoiceDetail, PurchaseInvoiceStatus,
    PurchaseInvoiceStatusRequest,
};
