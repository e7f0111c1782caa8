pub mod inventory_item;
pub mod stock_line;
pub mod stock_movement;

pub use inventory_item::{InventoryItem, InventoryItemRequest, ITEM_CODE_PREFIX};
pub use stock_line::{stock_changes, sum_by, StockLine, StockLineInput};
pub use stock_movement::{next_balance, MovementType, StockChange, StockMovement};
