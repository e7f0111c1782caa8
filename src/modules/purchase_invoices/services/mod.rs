pub mod purchase_invoice_service;

pub use purchase_invoice_service::PurchaseInvoiceService;
