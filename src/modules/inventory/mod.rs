pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{
    InventoryItem, MovementType, StockChange, StockLine, StockLineInput, StockMovement,
};
pub use repositories::{InventoryRepository, MySqlInventoryRepository, StockLineTable};
pub use services::InventoryService;
