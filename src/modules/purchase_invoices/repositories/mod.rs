pub mod purchase_invoice_repository;

pub use purchase_invoice_repository::{
    MySqlPurchaseInvoiceRepository, PurchaseInvoiceRepository, PURCHASE_INVOICE_LINES,
};
