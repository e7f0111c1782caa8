pub mod enquiry;

pub use enquiry::{
    CreateEnquiryRequest, Enquiry, EnquiryDetail, EnquiryItem, EnquiryItemInput,
    EnquiryStatus, EnquiryStatusRequest, UpdateEnquiryRequest,
};
