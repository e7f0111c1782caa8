pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Enquiry, EnquiryItem, EnquiryStatus};
pub use repositories::{EnquiryRepository, MySqlEnquiryRepository};
pub use services::EnquiryService;
