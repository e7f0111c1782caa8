use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::amounts::validate_quantity;
use crate::core::line_items::DEFAULT_UNIT;
use crate::core::validation::{clean, limit_text};
use crate::core::FieldError;
use crate::modules::inventory::models::{MovementType, StockChange};

/// Unpriced line of a stock document (receipt, return, issue)
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct StockLine {
    pub id: String,
    pub document_id: String,
    pub line_number: i32,
    /// Line of the document this one answers to (LPO line for receipts, receipt line for returns)
    pub source_line_id: Option<String>,
    pub inventory_item_id: String,
    pub description: String,
    pub quantity: Decimal,
    pub unit: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StockLineInput {
    #[serde(default)]
    pub source_line_id: Option<String>,
    /// Taken from the source line when omitted
    #[serde(default)]
    pub inventory_item_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: Decimal,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl StockLineInput {
    pub fn validate(&self, prefix: &str) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if let Err(msg) = validate_quantity(self.quantity) {
            errors.push(FieldError::new(format!("{}.quantity", prefix), msg));
        }
        limit_text(&mut errors, &format!("{}.description", prefix), self.description.as_deref(), 500);
        limit_text(&mut errors, &format!("{}.unit", prefix), self.unit.as_deref(), 20);
        errors
    }
}

impl StockLine {
    pub fn new(
        document_id: &str,
        line_number: i32,
        inventory_item_id: String,
        description: String,
        unit: Option<String>,
        input: &StockLineInput,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            document_id: document_id.to_string(),
            line_number,
            source_line_id: clean(input.source_line_id.clone()),
            inventory_item_id,
            description,
            quantity: input.quantity,
            unit: unit.unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            notes: clean(input.notes.clone()),
        }
    }

    pub fn stock_change(
        &self,
        movement_type: MovementType,
        reference_id: &str,
        reference_number: &str,
    ) -> StockChange {
        StockChange {
            inventory_item_id: self.inventory_item_id.clone(),
            movement_type,
            quantity: self.quantity,
            reference_id: reference_id.to_string(),
            reference_number: reference_number.to_string(),
        }
    }
}

/// Stock changes for every line of a document, in line order
pub fn stock_changes(
    lines: &[StockLine],
    movement_type: MovementType,
    reference_id: &str,
    reference_number: &str,
) -> Vec<StockChange> {
    lines
        .iter()
        .map(|l| l.stock_change(movement_type, reference_id, reference_number))
        .collect()
}

/// Quantity per key across lines, e.g. per source line or per item
pub fn sum_by<'a, F>(lines: impl IntoIterator<Item = &'a StockLine>, key: F) -> Vec<(String, Decimal)>
where
    F: Fn(&StockLine) -> Option<String>,
{
    let mut totals: Vec<(String, Decimal)> = Vec::new();
    for line in lines {
        if let Some(k) = key(line) {
            match totals.iter_mut().find(|(existing, _)| *existing == k) {
                Some((_, qty)) => *qty += line.quantity,
                None => totals.push((k, line.quantity)),
            }
        }
    }
    totals
}
