pub mod enquiry_repository;

pub use enquiry_repository::{EnquiryRepository, MySqlEnquiryRepository};
