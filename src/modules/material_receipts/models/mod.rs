pub mod material_receipt;

pub use material_receipt::{
    CreateMaterialReceiptRequest, MaterialReceipt, MaterialReceiptDetail, ReceiptStatus,
};
