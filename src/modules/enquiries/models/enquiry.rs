use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::amounts::validate_quantity;
use crate::core::line_items::DEFAULT_UNIT;
use crate::core::validation::{clean, limit_text, require_text};
use crate::core::{AppError, FieldError, Result, StatusFlow};
use crate::string_enum;

string_enum! {
    pub enum EnquiryStatus {
        New => "new",
        InProgress => "in_progress",
        Quoted => "quoted",
        Closed => "closed",
        Cancelled => "cancelled",
    }
}

impl StatusFlow for EnquiryStatus {
    const DOCUMENT: &'static str = "Enquiry";

    fn next_states(self) -> &'static [Self] {
        use EnquiryStatus::*;
        match self {
            New => &[InProgress, Quoted, Cancelled],
            InProgress => &[Quoted, Cancelled],
            Quoted => &[InProgress, Closed],
            Closed | Cancelled => &[],
        }
    }
}

impl EnquiryStatus {
    /// Items can be added, changed or removed
    pub fn items_editable(self) -> bool {
        matches!(self, EnquiryStatus::New | EnquiryStatus::InProgress)
    }
}

/// Customer request for pricing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enquiry {
    pub id: String,
    pub enquiry_number: String,
    pub customer_id: String,
    pub enquiry_date: NaiveDate,
    pub required_by: Option<NaiveDate>,
    pub subject: String,
    pub reference: Option<String>,
    pub status: EnquiryStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Requested item; enquiries carry no pricing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnquiryItem {
    pub id: String,
    pub enquiry_id: String,
    pub line_number: i32,
    pub inventory_item_id: Option<String>,
    pub description: String,
    pub quantity: Decimal,
    pub unit: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnquiryDetail {
    #[serde(flatten)]
    pub enquiry: Enquiry,
    pub items: Vec<EnquiryItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnquiryItemInput {
    #[serde(default)]
    pub inventory_item_id: Option<String>,
    pub description: String,
    pub quantity: Decimal,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl EnquiryItemInput {
    pub fn validate(&self, prefix: &str) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require_text(&mut errors, &format!("{}.description", prefix), &self.description, 500);
        if let Err(msg) = validate_quantity(self.quantity) {
            errors.push(FieldError::new(format!("{}.quantity", prefix), msg));
        }
        limit_text(&mut errors, &format!("{}.unit", prefix), self.unit.as_deref(), 20);
        errors
    }
}

impl EnquiryItem {
    pub fn new(enquiry_id: &str, line_number: i32, input: EnquiryItemInput) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            enquiry_id: enquiry_id.to_string(),
            line_number,
            inventory_item_id: clean(input.inventory_item_id),
            description: input.description.trim().to_string(),
            quantity: input.quantity,
            unit: clean(input.unit).unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            notes: clean(input.notes),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateEnquiryRequest {
    pub customer_id: String,
    #[serde(default)]
    pub enquiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub required_by: Option<NaiveDate>,
    pub subject: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<EnquiryItemInput>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateEnquiryRequest {
    pub subject: String,
    #[serde(default)]
    pub required_by: Option<NaiveDate>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn check_header(
    errors: &mut Vec<FieldError>,
    subject: &str,
    enquiry_date: NaiveDate,
    required_by: Option<NaiveDate>,
) {
    require_text(errors, "subject", subject, 200);
    if let Some(required_by) = required_by {
        if required_by < enquiry_date {
            errors.push(FieldError::new(
                "required_by",
                "required_by cannot be before enquiry_date",
            ));
        }
    }
}

impl CreateEnquiryRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        require_text(&mut errors, "customer_id", &self.customer_id, 36);
        check_header(
            &mut errors,
            &self.subject,
            self.enquiry_date.unwrap_or_else(|| Utc::now().date_naive()),
            self.required_by,
        );
        for (idx, item) in self.items.iter().enumerate() {
            errors.extend(item.validate(&format!("items[{}]", idx)));
        }
        AppError::from_fields(errors)
    }
}

impl UpdateEnquiryRequest {
    pub fn validate(&self, enquiry_date: NaiveDate) -> Result<()> {
        let mut errors = Vec::new();
        check_header(&mut errors, &self.subject, enquiry_date, self.required_by);
        AppError::from_fields(errors)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnquiryStatusRequest {
    pub status: EnquiryStatus,
}

impl Enquiry {
    pub fn new(enquiry_number: String, request: &CreateEnquiryRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            enquiry_number,
            customer_id: request.customer_id.trim().to_string(),
            enquiry_date: request.enquiry_date.unwrap_or_else(|| now.date_naive()),
            required_by: request.required_by,
            subject: request.subject.trim().to_string(),
            reference: clean(request.reference.clone()),
            status: EnquiryStatus::New,
            notes: clean(request.notes.clone()),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Renumber items 1..n after a removal
pub fn renumber(items: &mut [EnquiryItem]) {
    for (idx, item) in items.iter_mut().enumerate() {
        item.line_number = idx as i32 + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_flow() {
        use EnquiryStatus::*;
        assert!(New.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Quoted));
        assert!(Quoted.can_transition_to(InProgress));
        assert!(Quoted.can_transition_to(Closed));
        assert!(!Quoted.can_transition_to(Cancelled));
        assert!(Closed.is_terminal());
        assert!(Cancelled.is_terminal());
    }

    #[test]
    fn test_items_editable_only_early() {
        assert!(EnquiryStatus::New.items_editable());
        assert!(EnquiryStatus::InProgress.items_editable());
        assert!(!EnquiryStatus::Quoted.items_editable());
    }

    #[test]
    fn test_create_request_validation() {
        let request: CreateEnquiryRequest = serde_json::from_value(serde_json::json!({
            "customer_id": "c-1",
            "subject": "Cables for site B",
            "enquiry_date": "2026-03-10",
            "required_by": "2026-03-01",
            "items": [{"description": "", "quantity": "0"}]
        }))
        .unwrap();

        match request.validate().unwrap_err() {
            AppError::FieldValidation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(
                    names,
                    vec!["required_by", "items[0].description", "items[0].quantity"]
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
