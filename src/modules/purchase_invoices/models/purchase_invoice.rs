use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::validation::{clean, limit_text, require_text};
use crate::core::{
    AppError, Currency, DocumentTotals, FieldError, LineItemInput, PricedLine, Result, StatusFlow,
};
use crate::string_enum;

string_enum! {
    pub enum PurchaseInvoiceStatus {
        Draft => "draft",
        Approved => "approved",
        Paid => "paid",
        Cancelled => "cancelled",
    }
}

impl StatusFlow for PurchaseInvoiceStatus {
    const DOCUMENT: &'static str = "Purchase invoice";

    fn next_states(self) -> &'static [Self] {
        use PurchaseInvoiceStatus::*;
        match self {
            Draft => &[Approved, Cancelled],
            Approved => &[Paid, Cancelled],
            Paid | Cancelled => &[],
        }
    }
}

/// Supplier bill
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseInvoice {
    pub id: String,
    pub invoice_number: String,
    pub supplier_id: String,
    /// The supplier's own invoice number, unique per supplier
    pub supplier_invoice_number: String,
    pub supplier_lpo_id: Option<String>,
    pub material_receipt_id: Option<String>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub currency: Currency,
    pub status: PurchaseInvoiceStatus,
    #[serde(flatten)]
    pub totals: DocumentTotals,
    pub notes: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseInvoiceDetail {
    #[serde(flatten)]
    pub invoice: PurchaseInvoice,
    pub items: Vec<PricedLine>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreatePurchaseInvoiceRequest {
    pub supplier_id: String,
    pub supplier_invoice_number: String,
    #[serde(default)]
    pub supplier_lpo_id: Option<String>,
    #[serde(default)]
    pub material_receipt_id: Option<String>,
    #[serde(default)]
    pub invoice_date: Option<NaiveDate>,
    /// Defaults to the invoice date plus the supplier's payment terms
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<LineItemInput>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PurchaseInvoiceStatusRequest {
    pub status: PurchaseInvoiceStatus,
}

impl CreatePurchaseInvoiceRequest {
    pub fn invoice_date(&self) -> NaiveDate {
        self.invoice_date.unwrap_or_else(|| Utc::now().date_naive())
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        require_text(&mut errors, "supplier_id", &self.supplier_id, 36);
        require_text(
            &mut errors,
            "supplier_invoice_number",
            &self.supplier_invoice_number,
            100,
        );
        limit_text(&mut errors, "notes", self.notes.as_deref(), 2000);

        if let Some(due) = self.due_date {
            if due < self.invoice_date() {
                errors.push(FieldError::new(
                    "due_date",
                    "due_date cannot be before invoice_date",
                ));
            }
        }
        if self.items.is_empty() {
            errors.push(FieldError::new("items", "A purchase invoice needs at least one item"));
        }

        AppError::from_fields(errors)
    }
}

impl PurchaseInvoice {
    pub fn new(
        invoice_number: String,
        request: &CreatePurchaseInvoiceRequest,
        payment_terms_days: i32,
    ) -> Self {
        let now = Utc::now();
        let invoice_date = request.invoice_date();
        Self {
            id: Uuid::new_v4().to_string(),
            invoice_number,
            supplier_id: request.supplier_id.trim().to_string(),
            supplier_invoice_number: request.supplier_invoice_number.trim().to_string(),
            supplier_lpo_id: clean(request.supplier_lpo_id.clone()),
            material_receipt_id: clean(request.material_receipt_id.clone()),
            invoice_date,
            due_date: request
                .due_date
                .unwrap_or(invoice_date + Duration::days(payment_terms_days.max(0) as i64)),
            currency: request.currency,
            status: PurchaseInvoiceStatus::Draft,
            totals: DocumentTotals::default(),
            notes: clean(request.notes.clone()),
            approved_at: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn stamp(&mut self, next: PurchaseInvoiceStatus) {
        let now = Utc::now();
        match next {
            PurchaseInvoiceStatus::Approved => self.approved_at = Some(now),
            PurchaseInvoiceStatus::Paid => self.paid_at = Some(now),
            PurchaseInvoiceStatus::Draft | PurchaseInvoiceStatus::Cancelled => {}
        }
        self.status = next;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> CreatePurchaseInvoiceRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_due_date_before_invoice_date_rejected() {
        let req = request(serde_json::json!({
            "supplier_id": "s-1",
            "supplier_invoice_number": "INV-77",
            "invoice_date": "2026-04-10",
            "due_date": "2026-04-01",
            "items": [{"description": "Freight", "quantity": "1", "unit_price": "50"}]
        }));
        match req.validate().unwrap_err() {
            AppError::FieldValidation(fields) => assert_eq!(fields[0].field, "due_date"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_due_date_defaults_to_payment_terms() {
        let req = request(serde_json::json!({
            "supplier_id": "s-1",
            "supplier_invoice_number": "INV-77",
            "invoice_date": "2026-04-10",
            "items": []
        }));
        let invoice = PurchaseInvoice::new("PI-2026-0001".into(), &req, 30);
        assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2026, 5, 10).unwrap());
    }

    #[test]
    fn test_invoice_flow() {
        use PurchaseInvoiceStatus::*;
        assert!(Draft.can_transition_to(Approved));
        assert!(Approved.can_transition_to(Paid));
        assert!(!Paid.can_transition_to(Cancelled));
        assert!(!Draft.can_transition_to(Paid));
    }
}
