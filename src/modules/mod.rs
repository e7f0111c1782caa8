pub mod assistant;
pub mod documents;
pub mod email;
pub mod enquiries;
pub mod health;
pub mod inventory;
pub mod material_receipts;
pub mod parties;
pub mod purchase_invoices;
pub mod quotations;
pub mod receipt_returns;
pub mod sales_orders;
pub mod stock_issues;
pub mod supplier_lpos;
pub mod supplier_quotes;
