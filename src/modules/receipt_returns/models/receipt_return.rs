use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::validation::{clean, require_text};
use crate::core::{AppError, FieldError, Result, StatusFlow};
use crate::modules::inventory::{StockLine, StockLineInput};
use crate::string_enum;

string_enum! {
    pub enum ReturnStatus {
        Draft => "draft",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

impl StatusFlow for ReturnStatus {
    const DOCUMENT: &'static str = "Receipt return";

    fn next_states(self) -> &'static [Self] {
        match self {
            ReturnStatus::Draft => &[ReturnStatus::Completed, ReturnStatus::Cancelled],
            ReturnStatus::Completed | ReturnStatus::Cancelled => &[],
        }
    }
}

/// Goods sent back to the supplier against a completed receipt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptReturn {
    pub id: String,
    pub return_number: String,
    pub material_receipt_id: String,
    pub supplier_id: String,
    pub return_date: NaiveDate,
    pub reason: String,
    pub status: ReturnStatus,
    pub notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceiptReturnDetail {
    #[serde(flatten)]
    pub receipt_return: ReceiptReturn,
    pub items: Vec<StockLine>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateReceiptReturnRequest {
    pub material_receipt_id: String,
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Each line names the receipt line it returns through `source_line_id`
    pub items: Vec<StockLineInput>,
}

impl CreateReceiptReturnRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        require_text(&mut errors, "material_receipt_id", &self.material_receipt_id, 36);
        require_text(&mut errors, "reason", &self.reason, 500);

        if self.items.is_empty() {
            errors.push(FieldError::new("items", "A return needs at least one item"));
        }
        for (idx, item) in self.items.iter().enumerate() {
            let prefix = format!("items[{}]", idx);
            errors.extend(item.validate(&prefix));
            if clean(item.source_line_id.clone()).is_none() {
                errors.push(FieldError::new(
                    format!("{}.source_line_id", prefix),
                    "Each returned line must name the receipt line",
                ));
            }
        }

        AppError::from_fields(errors)
    }
}

impl ReceiptReturn {
    pub fn new(
        return_number: String,
        supplier_id: String,
        request: &CreateReceiptReturnRequest,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            return_number,
            material_receipt_id: request.material_receipt_id.trim().to_string(),
            supplier_id,
            return_date: request.return_date.unwrap_or_else(|| now.date_naive()),
            reason: request.reason.trim().to_string(),
            status: ReturnStatus::Draft,
            notes: clean(request.notes.clone()),
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_is_required() {
        let request: CreateReceiptReturnRequest = serde_json::from_value(serde_json::json!({
            "material_receipt_id": "grn-1",
            "reason": "   ",
            "items": [{"source_line_id": "line-1", "quantity": "1"}]
        }))
        .unwrap();
        match request.validate().unwrap_err() {
            AppError::FieldValidation(fields) => assert_eq!(fields[0].field, "reason"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_lines_must_reference_receipt_lines() {
        let request: CreateReceiptReturnRequest = serde_json::from_value(serde_json::json!({
            "material_receipt_id": "grn-1",
            "reason": "Damaged in transit",
            "items": [{"quantity": "1"}]
        }))
        .unwrap();
        match request.validate().unwrap_err() {
            AppError::FieldValidation(fields) => {
                assert_eq!(fields[0].field, "items[0].source_line_id")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
