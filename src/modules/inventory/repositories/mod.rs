pub mod inventory_repository;
pub mod stock_ledger;
pub mod stock_line_table;

pub use inventory_repository::{InventoryRepository, MySqlInventoryRepository};
pub use stock_ledger::{apply_stock_change, apply_stock_changes};
pub use stock_line_table::StockLineTable;
