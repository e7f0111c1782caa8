use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::validation::{clean, limit_text, require_text};
use crate::core::{
    AppError, Currency, DocumentTotals, FieldError, LineItemInput, PricedLine, Result, StatusFlow,
};
use crate::string_enum;

pub const DEFAULT_VALIDITY_DAYS: i64 = 30;

string_enum! {
    pub enum QuotationStatus {
        Draft => "draft",
        Sent => "sent",
        Accepted => "accepted",
        Rejected => "rejected",
        Expired => "expired",
        Cancelled => "cancelled",
    }
}

impl StatusFlow for QuotationStatus {
    const DOCUMENT: &'static str = "Quotation";

    fn next_states(self) -> &'static [Self] {
        use QuotationStatus::*;
        match self {
            Draft => &[Sent, Cancelled],
            Sent => &[Accepted, Rejected, Expired, Cancelled],
            Accepted | Rejected | Expired | Cancelled => &[],
        }
    }
}

/// Priced offer to a customer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quotation {
    pub id: String,
    pub quotation_number: String,
    pub customer_id: String,
    pub enquiry_id: Option<String>,
    pub quotation_date: NaiveDate,
    pub valid_until: NaiveDate,
    pub reference: Option<String>,
    pub currency: Currency,
    pub status: QuotationStatus,
    #[serde(flatten)]
    pub totals: DocumentTotals,
    pub notes: Option<String>,
    pub terms: Option<String>,
    /// Set once the quotation has been converted
    pub sales_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuotationDetail {
    #[serde(flatten)]
    pub quotation: Quotation,
    pub items: Vec<PricedLine>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateQuotationRequest {
    pub customer_id: String,
    #[serde(default)]
    pub enquiry_id: Option<String>,
    #[serde(default)]
    pub quotation_date: Option<NaiveDate>,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub terms: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItemInput>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateQuotationRequest {
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub terms: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuotationStatusRequest {
    pub status: QuotationStatus,
}

fn check_dates(errors: &mut Vec<FieldError>, date: NaiveDate, valid_until: Option<NaiveDate>) {
    if let Some(valid_until) = valid_until {
        if valid_until < date {
            errors.push(FieldError::new(
                "valid_until",
                "valid_until cannot be before quotation_date",
            ));
        }
    }
}

impl CreateQuotationRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        require_text(&mut errors, "customer_id", &self.customer_id, 36);
        limit_text(&mut errors, "reference", self.reference.as_deref(), 100);
        check_dates(
            &mut errors,
            self.quotation_date.unwrap_or_else(|| Utc::now().date_naive()),
            self.valid_until,
        );
        AppError::from_fields(errors)
    }
}

impl UpdateQuotationRequest {
    pub fn validate(&self, quotation_date: NaiveDate) -> Result<()> {
        let mut errors = Vec::new();
        limit_text(&mut errors, "reference", self.reference.as_deref(), 100);
        check_dates(&mut errors, quotation_date, self.valid_until);
        AppError::from_fields(errors)
    }
}

impl Quotation {
    pub fn new(quotation_number: String, request: &CreateQuotationRequest) -> Self {
        let now = Utc::now();
        let quotation_date = request.quotation_date.unwrap_or_else(|| now.date_naive());
        Self {
            id: Uuid::new_v4().to_string(),
            quotation_number,
            customer_id: request.customer_id.trim().to_string(),
            enquiry_id: clean(request.enquiry_id.clone()),
            quotation_date,
            valid_until: request
                .valid_until
                .unwrap_or(quotation_date + chrono::Duration::days(DEFAULT_VALIDITY_DAYS)),
            reference: clean(request.reference.clone()),
            currency: request.currency,
            status: QuotationStatus::Draft,
            totals: DocumentTotals::default(),
            notes: clean(request.notes.clone()),
            terms: clean(request.terms.clone()),
            sales_order_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}
