use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::validation::{clean, limit_text};
use crate::core::{AppError, FieldError, Result, StatusFlow};
use crate::modules::inventory::{StockLine, StockLineInput};
use crate::string_enum;

string_enum! {
    pub enum ReceiptStatus {
        Draft => "draft",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

impl StatusFlow for ReceiptStatus {
    const DOCUMENT: &'static str = "Material receipt";

    fn next_states(self) -> &'static [Self] {
        match self {
            ReceiptStatus::Draft => &[ReceiptStatus::Completed, ReceiptStatus::Cancelled],
            ReceiptStatus::Completed | ReceiptStatus::Cancelled => &[],
        }
    }
}

/// Goods received note
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialReceipt {
    pub id: String,
    pub receipt_number: String,
    pub supplier_id: String,
    pub supplier_lpo_id: Option<String>,
    pub receipt_date: NaiveDate,
    /// Supplier's delivery note number
    pub delivery_note: Option<String>,
    pub received_by: Option<String>,
    pub status: ReceiptStatus,
    pub notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaterialReceiptDetail {
    #[serde(flatten)]
    pub receipt: MaterialReceipt,
    pub items: Vec<StockLine>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateMaterialReceiptRequest {
    /// Required unless `supplier_lpo_id` is given
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub supplier_lpo_id: Option<String>,
    #[serde(default)]
    pub receipt_date: Option<NaiveDate>,
    #[serde(default)]
    pub delivery_note: Option<String>,
    #[serde(default)]
    pub received_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<StockLineInput>,
}

impl CreateMaterialReceiptRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        let against_lpo = clean(self.supplier_lpo_id.clone()).is_some();

        if clean(self.supplier_id.clone()).is_none() && !against_lpo {
            errors.push(FieldError::new(
                "supplier_id",
                "supplier_id is required when no supplier_lpo_id is given",
            ));
        }
        limit_text(&mut errors, "delivery_note", self.delivery_note.as_deref(), 100);
        limit_text(&mut errors, "received_by", self.received_by.as_deref(), 100);

        if self.items.is_empty() {
            errors.push(FieldError::new("items", "A receipt needs at least one item"));
        }
        for (idx, item) in self.items.iter().enumerate() {
            let prefix = format!("items[{}]", idx);
            errors.extend(item.validate(&prefix));
            if against_lpo && clean(item.source_line_id.clone()).is_none() {
                errors.push(FieldError::new(
                    format!("{}.source_line_id", prefix),
                    "Receipts against an LPO must name the LPO line",
                ));
            }
            if !against_lpo && clean(item.inventory_item_id.clone()).is_none() {
                errors.push(FieldError::new(
                    format!("{}.inventory_item_id", prefix),
                    "inventory_item_id is required",
                ));
            }
        }

        AppError::from_fields(errors)
    }
}

impl MaterialReceipt {
    pub fn new(
        receipt_number: String,
        supplier_id: String,
        request: &CreateMaterialReceiptRequest,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            receipt_number,
            supplier_id,
            supplier_lpo_id: clean(request.supplier_lpo_id.clone()),
            receipt_date: request.receipt_date.unwrap_or_else(|| now.date_naive()),
            delivery_note: clean(request.delivery_note.clone()),
            received_by: clean(request.received_by.clone()),
            status: ReceiptStatus::Draft,
            notes: clean(request.notes.clone()),
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
