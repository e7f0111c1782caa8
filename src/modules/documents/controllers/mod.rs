pub mod pdf_response;

pub use pdf_response::pdf_response;
