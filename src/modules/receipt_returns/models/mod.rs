pub mod receipt_return;

pub use receipt_return::{
    CreateReceiptReturnRequest, ReceiptReturn, ReceiptReturnDetail, ReturnStatus,
};
