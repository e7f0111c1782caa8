pub mod supplier_lpo_repository;

pub use supplier_lpo_repository::{
    MySqlSupplierLpoRepository, SupplierLpoRepository, SUPPLIER_LPO_LINES,
};
