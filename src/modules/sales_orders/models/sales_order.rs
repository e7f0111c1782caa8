use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::validation::{clean, limit_text, require_text};
use crate::core::{
    AppError, Currency, DocumentTotals, FieldError, LineItemInput, PricedLine, Result, StatusFlow,
};
use crate::string_enum;

string_enum! {
    pub enum SalesOrderStatus {
        Draft => "draft",
        Confirmed => "confirmed",
        Processing => "processing",
        Delivered => "delivered",
        Closed => "closed",
        Cancelled => "cancelled",
    }
}

impl StatusFlow for SalesOrderStatus {
    const DOCUMENT: &'static str = "Sales order";

    fn next_states(self) -> &'static [Self] {
        use SalesOrderStatus::*;
        match self {
            Draft => &[Confirmed, Cancelled],
            Confirmed => &[Processing, Cancelled],
            Processing => &[Delivered, Cancelled],
            Delivered => &[Closed],
            Closed | Cancelled => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesOrder {
    pub id: String,
    pub order_number: String,
    pub customer_id: String,
    pub quotation_id: Option<String>,
    pub order_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    /// Customer's own purchase order number
    pub customer_reference: Option<String>,
    pub currency: Currency,
    pub status: SalesOrderStatus,
    #[serde(flatten)]
    pub totals: DocumentTotals,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesOrderDetail {
    #[serde(flatten)]
    pub order: SalesOrder,
    pub items: Vec<PricedLine>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateSalesOrderRequest {
    pub customer_id: String,
    #[serde(default)]
    pub order_date: Option<NaiveDate>,
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub customer_reference: Option<String>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub terms: Option<String>,
    pub items: Vec<LineItemInput>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SalesOrderStatusRequest {
    pub status: SalesOrderStatus,
}

impl CreateSalesOrderRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        require_text(&mut errors, "customer_id", &self.customer_id, 36);
        limit_text(&mut errors, "customer_reference", self.customer_reference.as_deref(), 100);
        if self.items.is_empty() {
            errors.push(FieldError::new("items", "A sales order needs at least one item"));
        }
        let order_date = self.order_date.unwrap_or_else(|| Utc::now().date_naive());
        if let Some(delivery) = self.delivery_date {
            if delivery < order_date {
                errors.push(FieldError::new(
                    "delivery_date",
                    "delivery_date cannot be before order_date",
                ));
            }
        }
        AppError::from_fields(errors)
    }
}

impl SalesOrder {
    pub fn new(order_number: String, request: &CreateSalesOrderRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            order_number,
            customer_id: request.customer_id.trim().to_string(),
            quotation_id: None,
            order_date: request.order_date.unwrap_or_else(|| now.date_naive()),
            delivery_date: request.delivery_date,
            customer_reference: clean(request.customer_reference.clone()),
            currency: request.currency,
            status: SalesOrderStatus::Draft,
            totals: DocumentTotals::default(),
            notes: clean(request.notes.clone()),
            terms: clean(request.terms.clone()),
            created_at: now,
            updated_at: now,
        }
    }
}
