use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use crate::core::{AppError, Result};
use crate::string_enum;

string_enum! {
    /// Document type that moved stock
    pub enum MovementType {
        Receipt => "receipt",
        ReceiptReturn => "receipt_return",
        Issue => "issue",
    }
}

impl MovementType {
    /// +1 for stock in, -1 for stock out
    pub fn direction(&self) -> Decimal {
        match self {
            MovementType::Receipt => Decimal::ONE,
            MovementType::ReceiptReturn | MovementType::Issue => Decimal::NEGATIVE_ONE,
        }
    }
}

/// One row of the stock ledger
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct StockMovement {
    pub id: String,
    pub inventory_item_id: String,
    pub movement_type: String,
    /// Signed: positive in, negative out
    pub quantity: Decimal,
    pub balance_after: Decimal,
    pub reference_type: String,
    pub reference_id: String,
    pub reference_number: String,
    pub created_at: DateTime<Utc>,
}

/// A stock change requested by a document
#[derive(Debug, Clone)]
pub struct StockChange {
    pub inventory_item_id: String,
    pub movement_type: MovementType,
    /// Unsigned quantity; the movement type gives the direction
    pub quantity: Decimal,
    pub reference_id: String,
    pub reference_number: String,
}

impl StockChange {
    pub fn signed_quantity(&self) -> Decimal {
        self.quantity * self.movement_type.direction()
    }
}

/// Balance after applying `delta`, refusing to go below zero
pub fn next_balance(item_code: &str, on_hand: Decimal, delta: Decimal) -> Result<Decimal> {
    let balance = on_hand + delta;
    if balance < Decimal::ZERO {
        return Err(AppError::InsufficientStock(format!(
            "Item '{}' has {} on hand, cannot remove {}",
            item_code,
            on_hand,
            -delta
        )));
    }
    Ok(balance)
}
