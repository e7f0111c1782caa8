use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::amounts::validate_unit_price;
use crate::core::line_items::DEFAULT_UNIT;
use crate::core::validation::{clean, limit_text, require_text};
use crate::core::{AppError, FieldError, Result};

pub const ITEM_CODE_PREFIX: &str = "ITM";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InventoryItem {
    pub id: String,
    pub item_code: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit: String,
    pub unit_cost: Decimal,
    pub selling_price: Decimal,
    /// Only changed by stock movements
    pub quantity_on_hand: Decimal,
    pub reorder_level: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn new(item_code: String, request: InventoryItemRequest) -> Self {
        let now = Utc::now();
        let mut item = Self {
            id: Uuid::new_v4().to_string(),
            item_code,
            name: String::new(),
            description: None,
            category: None,
            unit: DEFAULT_UNIT.to_string(),
            unit_cost: Decimal::ZERO,
            selling_price: Decimal::ZERO,
            quantity_on_hand: Decimal::ZERO,
            reorder_level: Decimal::ZERO,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        item.apply(request);
        item
    }

    pub fn apply(&mut self, request: InventoryItemRequest) {
        self.name = request.name.trim().to_string();
        self.description = clean(request.description);
        self.category = clean(request.category);
        self.unit = clean(request.unit).unwrap_or_else(|| DEFAULT_UNIT.to_string());
        self.unit_cost = request.unit_cost.unwrap_or(Decimal::ZERO);
        self.selling_price = request.selling_price.unwrap_or(Decimal::ZERO);
        self.reorder_level = request.reorder_level.unwrap_or(Decimal::ZERO);
        self.is_active = request.is_active.unwrap_or(true);
        self.updated_at = Utc::now();
    }

    pub fn needs_reorder(&self) -> bool {
        self.quantity_on_hand <= self.reorder_level
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InventoryItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub unit_cost: Option<Decimal>,
    #[serde(default)]
    pub selling_price: Option<Decimal>,
    #[serde(default)]
    pub reorder_level: Option<Decimal>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl InventoryItemRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        require_text(&mut errors, "name", &self.name, 200);
        limit_text(&mut errors, "description", self.description.as_deref(), 1000);
        limit_text(&mut errors, "category", self.category.as_deref(), 100);
        limit_text(&mut errors, "unit", self.unit.as_deref(), 20);

        for (field, value) in [
            ("unit_cost", self.unit_cost),
            ("selling_price", self.selling_price),
            ("reorder_level", self.reorder_level),
        ] {
            if let Some(value) = value {
                if let Err(msg) = validate_unit_price(value) {
                    errors.push(FieldError::new(field, msg.replace("Unit price", field)));
                }
            }
        }

        AppError::from_fields(errors)
    }
}
