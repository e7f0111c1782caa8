//! Tradeflow trading ERP library
//!
//! Sales (enquiries, quotations, sales orders), purchasing (supplier quotes,
//! LPOs, receipts, returns, purchase invoices) and stock, served over a JSON API.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;
pub mod state;

pub use state::{AppState, Integrations, Repositories};
