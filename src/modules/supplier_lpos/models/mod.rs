pub mod supplier_lpo;

pub use supplier_lpo::{
    CreateSupplierLpoRequest, LpoAction, LpoEmailRequest, LpoStatus, LpoStatusChange,
    LpoStatusRequest, SupplierLpo, SupplierLpoDetail, UpdateSupplierLpoRequest,
};
