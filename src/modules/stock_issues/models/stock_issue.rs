use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::validation::{clean, limit_text};
use crate::core::{AppError, FieldError, Result, StatusFlow};
use crate::modules::inventory::{StockLine, StockLineInput};
use crate::string_enum;

string_enum! {
    pub enum IssueStatus {
        Draft => "draft",
        Issued => "issued",
        Cancelled => "cancelled",
    }
}

impl StatusFlow for IssueStatus {
    const DOCUMENT: &'static str = "Stock issue";

    fn next_states(self) -> &'static [Self] {
        match self {
            IssueStatus::Draft => &[IssueStatus::Issued, IssueStatus::Cancelled],
            IssueStatus::Issued | IssueStatus::Cancelled => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockIssue {
    pub id: String,
    pub issue_number: String,
    pub issue_date: NaiveDate,
    /// Department, site or person receiving the goods
    pub issued_to: Option<String>,
    pub sales_order_id: Option<String>,
    pub purpose: Option<String>,
    pub status: IssueStatus,
    pub notes: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockIssueDetail {
    #[serde(flatten)]
    pub issue: StockIssue,
    pub items: Vec<StockLine>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateStockIssueRequest {
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub issued_to: Option<String>,
    #[serde(default)]
    pub sales_order_id: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<StockLineInput>,
}

impl CreateStockIssueRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        limit_text(&mut errors, "issued_to", self.issued_to.as_deref(), 200);
        limit_text(&mut errors, "purpose", self.purpose.as_deref(), 500);

        if self.items.is_empty() {
            errors.push(FieldError::new("items", "A stock issue needs at least one item"));
        }
        for (idx, item) in self.items.iter().enumerate() {
            let prefix = format!("items[{}]", idx);
            errors.extend(item.validate(&prefix));
            if clean(item.inventory_item_id.clone()).is_none() {
                errors.push(FieldError::new(
                    format!("{}.inventory_item_id", prefix),
                    "inventory_item_id is required",
                ));
            }
        }

        AppError::from_fields(errors)
    }
}

impl StockIssue {
    pub fn new(issue_number: String, request: &CreateStockIssueRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            issue_number,
            issue_date: request.issue_date.unwrap_or_else(|| now.date_naive()),
            issued_to: clean(request.issued_to.clone()),
            sales_order_id: clean(request.sales_order_id.clone()),
            purpose: clean(request.purpose.clone()),
            status: IssueStatus::Draft,
            notes: clean(request.notes.clone()),
            issued_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
