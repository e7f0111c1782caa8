pub mod receipt_return_repository;

pub use receipt_return_repository::{
    MySqlReceiptReturnRepository, ReceiptReturnRepository, RETURN_LINES,
};
