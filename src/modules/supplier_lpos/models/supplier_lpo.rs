use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::validation::{clean, limit_text, require_text};
use crate::core::{
    AppError, Currency, DocumentTotals, FieldError, LineItemInput, PricedLine, Result, StatusFlow,
};
use crate::string_enum;

string_enum! {
    pub enum LpoStatus {
        Draft => "draft",
        Submitted => "submitted",
        Approved => "approved",
        Rejected => "rejected",
        SentToSupplier => "sent_to_supplier",
        Confirmed => "confirmed",
        Cancelled => "cancelled",
    }
}

impl StatusFlow for LpoStatus {
    const DOCUMENT: &'static str = "Supplier LPO";

    fn next_states(self) -> &'static [Self] {
        use LpoStatus::*;
        match self {
            Draft => &[Submitted, Cancelled],
            Submitted => &[Approved, Rejected, Cancelled],
            Rejected => &[Draft, Cancelled],
            Approved => &[SentToSupplier, Cancelled],
            SentToSupplier => &[Confirmed, Cancelled],
            Confirmed | Cancelled => &[],
        }
    }
}

impl LpoStatus {
    /// Header and lines may be edited
    pub fn is_editable(self) -> bool {
        matches!(self, LpoStatus::Draft | LpoStatus::Rejected)
    }

    /// Approved and not cancelled: goods may be received and the PDF emailed
    pub fn is_released(self) -> bool {
        matches!(
            self,
            LpoStatus::Approved | LpoStatus::SentToSupplier | LpoStatus::Confirmed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierLpo {
    pub id: String,
    pub lpo_number: String,
    pub supplier_id: String,
    pub supplier_quote_id: Option<String>,
    pub lpo_date: NaiveDate,
    pub expected_delivery_date: Option<NaiveDate>,
    pub delivery_address: Option<String>,
    pub payment_terms: Option<String>,
    pub currency: Currency,
    pub status: LpoStatus,
    #[serde(flatten)]
    pub totals: DocumentTotals,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub created_by: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Supplier's order acknowledgement number
    pub supplier_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplierLpoDetail {
    #[serde(flatten)]
    pub lpo: SupplierLpo,
    pub items: Vec<PricedLine>,
}

/// One row of the approval audit trail
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LpoStatusChange {
    pub id: String,
    pub lpo_id: String,
    pub from_status: Option<LpoStatus>,
    pub to_status: LpoStatus,
    pub performed_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LpoStatusChange {
    pub fn new(
        lpo_id: &str,
        from_status: Option<LpoStatus>,
        to_status: LpoStatus,
        performed_by: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            lpo_id: lpo_id.to_string(),
            from_status,
            to_status,
            performed_by,
            notes,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateSupplierLpoRequest {
    pub supplier_id: String,
    #[serde(default)]
    pub supplier_quote_id: Option<String>,
    #[serde(default)]
    pub lpo_date: Option<NaiveDate>,
    #[serde(default)]
    pub expected_delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub terms: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItemInput>,
}

/// Full replacement of the editable header fields; `items` replaces every line when present
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateSupplierLpoRequest {
    #[serde(default)]
    pub expected_delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub terms: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<LineItemInput>>,
    #[serde(default)]
    pub performed_by: Option<String>,
}

/// `PATCH /{id}/status` body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LpoStatusRequest {
    pub status: LpoStatus,
    #[serde(flatten)]
    pub action: LpoAction,
}

/// Who performed a workflow step and the side data it carries
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LpoAction {
    #[serde(default)]
    pub performed_by: Option<String>,
    /// Free text; for a rejection this is the reason
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub supplier_reference: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LpoEmailRequest {
    /// Defaults to the supplier's email address
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub performed_by: Option<String>,
}

fn check_delivery_date(
    errors: &mut Vec<FieldError>,
    lpo_date: NaiveDate,
    expected: Option<NaiveDate>,
) {
    if let Some(expected) = expected {
        if expected < lpo_date {
            errors.push(FieldError::new(
                "expected_delivery_date",
                "expected_delivery_date cannot be before lpo_date",
            ));
        }
    }
}

impl CreateSupplierLpoRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        require_text(&mut errors, "supplier_id", &self.supplier_id, 36);
        limit_text(&mut errors, "delivery_address", self.delivery_address.as_deref(), 500);
        limit_text(&mut errors, "payment_terms", self.payment_terms.as_deref(), 200);
        limit_text(&mut errors, "created_by", self.created_by.as_deref(), 100);
        let lpo_date = self.lpo_date.unwrap_or_else(|| Utc::now().date_naive());
        check_delivery_date(&mut errors, lpo_date, self.expected_delivery_date);
        AppError::from_fields(errors)
    }
}

impl UpdateSupplierLpoRequest {
    pub fn validate(&self, lpo_date: NaiveDate) -> Result<()> {
        let mut errors = Vec::new();
        limit_text(&mut errors, "delivery_address", self.delivery_address.as_deref(), 500);
        limit_text(&mut errors, "payment_terms", self.payment_terms.as_deref(), 200);
        check_delivery_date(&mut errors, lpo_date, self.expected_delivery_date);
        AppError::from_fields(errors)
    }
}

impl SupplierLpo {
    pub fn new(lpo_number: String, request: &CreateSupplierLpoRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            lpo_number,
            supplier_id: request.supplier_id.trim().to_string(),
            supplier_quote_id: clean(request.supplier_quote_id.clone()),
            lpo_date: request.lpo_date.unwrap_or_else(|| now.date_naive()),
            expected_delivery_date: request.expected_delivery_date,
            delivery_address: clean(request.delivery_address.clone()),
            payment_terms: clean(request.payment_terms.clone()),
            currency: request.currency,
            status: LpoStatus::Draft,
            totals: DocumentTotals::default(),
            notes: clean(request.notes.clone()),
            terms: clean(request.terms.clone()),
            created_by: clean(request.created_by.clone()),
            submitted_at: None,
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
            sent_at: None,
            confirmed_at: None,
            supplier_reference: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `next`, stamping the side data of the step.
    ///
    /// The caller has already checked the transition table.
    pub fn stamp(&mut self, next: LpoStatus, action: &LpoAction) -> Result<()> {
        let now = Utc::now();
        match next {
            LpoStatus::Submitted => self.submitted_at = Some(now),
            LpoStatus::Approved => {
                self.approved_by = clean(action.performed_by.clone());
                self.approved_at = Some(now);
                self.rejection_reason = None;
            }
            LpoStatus::Rejected => {
                let reason = clean(action.notes.clone()).ok_or_else(|| {
                    AppError::FieldValidation(vec![FieldError::new(
                        "notes",
                        "A rejection reason is required",
                    )])
                })?;
                self.rejection_reason = Some(reason);
            }
            LpoStatus::SentToSupplier => self.sent_at = Some(now),
            LpoStatus::Confirmed => {
                self.confirmed_at = Some(now);
                if let Some(reference) = clean(action.supplier_reference.clone()) {
                    self.supplier_reference = Some(reference);
                }
            }
            LpoStatus::Draft => {
                self.submitted_at = None;
            }
            LpoStatus::Cancelled => {}
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every (from, to) pair the workflow accepts
    const ALLOWED: &[(LpoStatus, LpoStatus)] = &[
        (LpoStatus::Draft, LpoStatus::Submitted),
        (LpoStatus::Draft, LpoStatus::Cancelled),
        (LpoStatus::Submitted, LpoStatus::Approved),
        (LpoStatus::Submitted, LpoStatus::Rejected),
        (LpoStatus::Submitted, LpoStatus::Cancelled),
        (LpoStatus::Rejected, LpoStatus::Draft),
        (LpoStatus::Rejected, LpoStatus::Cancelled),
        (LpoStatus::Approved, LpoStatus::SentToSupplier),
        (LpoStatus::Approved, LpoStatus::Cancelled),
        (LpoStatus::SentToSupplier, LpoStatus::Confirmed),
        (LpoStatus::SentToSupplier, LpoStatus::Cancelled),
    ];

    #[test]
    fn test_transition_table_is_exact() {
        for &from in LpoStatus::ALL {
            for &to in LpoStatus::ALL {
                let expected = ALLOWED.contains(&(from, to));
                assert_eq!(from.can_transition_to(to), expected, "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(LpoStatus::Confirmed.is_terminal());
        assert!(LpoStatus::Cancelled.is_terminal());
        assert!(!LpoStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_invalid_transition_error() {
        match LpoStatus::Draft.ensure_transition(LpoStatus::Approved) {
            Err(AppError::InvalidTransition(msg)) => {
                assert!(msg.contains("draft"));
                assert!(msg.contains("approved"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    fn sample() -> SupplierLpo {
        let request: CreateSupplierLpoRequest = serde_json::from_value(serde_json::json!({
            "supplier_id": "s-1",
            "currency": "BHD"
        }))
        .unwrap();
        SupplierLpo::new("LPO-2026-0001".into(), &request)
    }

    #[test]
    fn test_reject_requires_reason() {
        let mut lpo = sample();
        lpo.status = LpoStatus::Submitted;
        assert!(lpo.stamp(LpoStatus::Rejected, &LpoAction::default()).is_err());
        assert_eq!(lpo.status, LpoStatus::Submitted);

        let action = LpoAction {
            notes: Some("Price too high".into()),
            ..Default::default()
        };
        lpo.stamp(LpoStatus::Rejected, &action).unwrap();
        assert_eq!(lpo.rejection_reason.as_deref(), Some("Price too high"));
    }

    #[test]
    fn test_stamps() {
        let mut lpo = sample();
        let action = LpoAction {
            performed_by: Some("manager".into()),
            supplier_reference: Some("SO-889".into()),
            ..Default::default()
        };
        lpo.stamp(LpoStatus::Approved, &action).unwrap();
        assert_eq!(lpo.approved_by.as_deref(), Some("manager"));
        assert!(lpo.approved_at.is_some());

        lpo.stamp(LpoStatus::SentToSupplier, &action).unwrap();
        assert!(lpo.sent_at.is_some());

        lpo.stamp(LpoStatus::Confirmed, &action).unwrap();
        assert!(lpo.confirmed_at.is_some());
        assert_eq!(lpo.supplier_reference.as_deref(), Some("SO-889"));
    }

    #[test]
    fn test_status_request_flattens_action() {
        let request: LpoStatusRequest = serde_json::from_value(serde_json::json!({
            "status": "sent_to_supplier",
            "performed_by": "buyer"
        }))
        .unwrap();
        assert_eq!(request.status, LpoStatus::SentToSupplier);
        assert_eq!(request.action.performed_by.as_deref(), Some("buyer"));
    }

    #[test]
    fn test_delivery_date_check() {
        let request: CreateSupplierLpoRequest = serde_json::from_value(serde_json::json!({
            "supplier_id": "s-1",
            "lpo_date": "2026-05-10",
            "expected_delivery_date": "2026-05-01"
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}
