use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::validation::{clean, limit_text, require_text};
use crate::core::{
    AppError, Currency, DocumentTotals, FieldError, LineItemInput, PricedLine, Result, StatusFlow,
};
use crate::string_enum;

string_enum! {
    pub enum SupplierQuoteStatus {
        Pending => "pending",
        Accepted => "accepted",
        Rejected => "rejected",
    }
}

impl StatusFlow for SupplierQuoteStatus {
    const DOCUMENT: &'static str = "Supplier quote";

    fn next_states(self) -> &'static [Self] {
        use SupplierQuoteStatus::*;
        match self {
            Pending => &[Accepted, Rejected],
            Accepted | Rejected => &[],
        }
    }
}

/// Supplier pricing, usually against an enquiry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierQuote {
    pub id: String,
    pub quote_number: String,
    pub supplier_id: String,
    pub enquiry_id: Option<String>,
    pub quote_date: NaiveDate,
    pub valid_until: Option<NaiveDate>,
    pub supplier_reference: Option<String>,
    pub currency: Currency,
    pub status: SupplierQuoteStatus,
    #[serde(flatten)]
    pub totals: DocumentTotals,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplierQuoteDetail {
    #[serde(flatten)]
    pub quote: SupplierQuote,
    pub items: Vec<PricedLine>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateSupplierQuoteRequest {
    pub supplier_id: String,
    #[serde(default)]
    pub enquiry_id: Option<String>,
    #[serde(default)]
    pub quote_date: Option<NaiveDate>,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    #[serde(default)]
    pub supplier_reference: Option<String>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItemInput>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateSupplierQuoteRequest {
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    #[serde(default)]
    pub supplier_reference: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SupplierQuoteStatusRequest {
    pub status: SupplierQuoteStatus,
}

fn check_validity(errors: &mut Vec<FieldError>, quote_date: NaiveDate, valid_until: Option<NaiveDate>) {
    if let Some(valid_until) = valid_until {
        if valid_until < quote_date {
            errors.push(FieldError::new(
                "valid_until",
                "valid_until cannot be before quote_date",
            ));
        }
    }
}

impl CreateSupplierQuoteRequest {
    /// Header checks; lines are validated when priced
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        require_text(&mut errors, "supplier_id", &self.supplier_id, 36);
        limit_text(&mut errors, "supplier_reference", self.supplier_reference.as_deref(), 100);
        check_validity(
            &mut errors,
            self.quote_date.unwrap_or_else(|| Utc::now().date_naive()),
            self.valid_until,
        );
        AppError::from_fields(errors)
    }
}

impl UpdateSupplierQuoteRequest {
    pub fn validate(&self, quote_date: NaiveDate) -> Result<()> {
        let mut errors = Vec::new();
        limit_text(&mut errors, "supplier_reference", self.supplier_reference.as_deref(), 100);
        check_validity(&mut errors, quote_date, self.valid_until);
        AppError::from_fields(errors)
    }
}

impl SupplierQuote {
    pub fn new(quote_number: String, request: &CreateSupplierQuoteRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            quote_number,
            supplier_id: request.supplier_id.trim().to_string(),
            enquiry_id: clean(request.enquiry_id.clone()),
            quote_date: request.quote_date.unwrap_or_else(|| now.date_naive()),
            valid_until: request.valid_until,
            supplier_reference: clean(request.supplier_reference.clone()),
            currency: request.currency,
            status: SupplierQuoteStatus::Pending,
            totals: DocumentTotals::default(),
            notes: clean(request.notes.clone()),
            created_at: now,
            updated_at: now,
        }
    }
}
