pub mod material_receipt_repository;

pub use material_receipt_repository::{
    MaterialReceiptRepository, MySqlMaterialReceiptRepository, RECEIPT_LINES,
};
