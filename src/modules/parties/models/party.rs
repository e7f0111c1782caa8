// Customer and supplier master records.
//
// Both tables share one shape; `PartyKind` carries what differs (table,
// code prefix, labels).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::validation::{self, clean, limit_text, require_text};
use crate::core::{AppError, FieldError, Result};

const MAX_NAME_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 100;
const MAX_ADDRESS_LEN: usize = 500;
pub const DEFAULT_PAYMENT_TERMS_DAYS: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyKind {
    Customer,
    Supplier,
}

impl PartyKind {
    pub fn table(&self) -> &'static str {
        match self {
            PartyKind::Customer => "customers",
            PartyKind::Supplier => "suppliers",
        }
    }

    pub fn code_prefix(&self) -> &'static str {
        match self {
            PartyKind::Customer => "CUST",
            PartyKind::Supplier => "SUP",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PartyKind::Customer => "Customer",
            PartyKind::Supplier => "Supplier",
        }
    }
}

/// Customer or supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Party {
    pub id: String,
    pub code: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub tax_number: Option<String>,
    pub credit_limit: Decimal,
    pub payment_terms_days: i32,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Party {
    /// New record from a validated request; the code is assigned by the caller
    pub fn new(code: String, request: PartyRequest) -> Self {
        let now = Utc::now();
        let mut party = Self {
            id: Uuid::new_v4().to_string(),
            code,
            name: String::new(),
            email: None,
            phone: None,
            address: None,
            contact_person: None,
            tax_number: None,
            credit_limit: Decimal::ZERO,
            payment_terms_days: DEFAULT_PAYMENT_TERMS_DAYS,
            notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        party.apply(request);
        party
    }

    /// Overwrite editable fields from a request
    pub fn apply(&mut self, request: PartyRequest) {
        self.name = request.name.trim().to_string();
        self.email = clean(request.email).map(|e| e.to_lowercase());
        self.phone = clean(request.phone);
        self.address = clean(request.address);
        self.contact_person = clean(request.contact_person);
        self.tax_number = clean(request.tax_number);
        self.credit_limit = request.credit_limit.unwrap_or(Decimal::ZERO);
        self.payment_terms_days = request
            .payment_terms_days
            .unwrap_or(DEFAULT_PAYMENT_TERMS_DAYS);
        self.notes = clean(request.notes);
        self.is_active = request.is_active.unwrap_or(true);
        self.updated_at = Utc::now();
    }

    /// Block shown under "Bill To" / "Supplier" on printed documents
    pub fn address_lines(&self) -> Vec<String> {
        let mut lines = vec![self.name.clone()];
        if let Some(address) = &self.address {
            lines.extend(address.lines().map(str::to_string));
        }
        if let Some(contact) = &self.contact_person {
            lines.push(format!("Attn: {}", contact));
        }
        if let Some(phone) = &self.phone {
            lines.push(format!("Tel: {}", phone));
        }
        if let Some(email) = &self.email {
            lines.push(email.clone());
        }
        if let Some(tax) = &self.tax_number {
            lines.push(format!("TRN: {}", tax));
        }
        lines
    }
}

/// Create/update body for customers and suppliers
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PartyRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub tax_number: Option<String>,
    #[serde(default)]
    pub credit_limit: Option<Decimal>,
    #[serde(default)]
    pub payment_terms_days: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl PartyRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<FieldError> = Vec::new();

        require_text(&mut errors, "name", &self.name, MAX_NAME_LEN);

        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            if !validation::is_valid_email(email) {
                errors.push(FieldError::new("email", "email is not a valid address"));
            }
        }

        limit_text(&mut errors, "phone", self.phone.as_deref(), MAX_TEXT_LEN);
        limit_text(&mut errors, "contact_person", self.contact_person.as_deref(), MAX_TEXT_LEN);
        limit_text(&mut errors, "tax_number", self.tax_number.as_deref(), MAX_TEXT_LEN);
        limit_text(&mut errors, "address", self.address.as_deref(), MAX_ADDRESS_LEN);

        if let Some(limit) = self.credit_limit {
            if limit < Decimal::ZERO {
                errors.push(FieldError::new("credit_limit", "credit_limit cannot be negative"));
            }
        }
        if let Some(days) = self.payment_terms_days {
            if !(0..=365).contains(&days) {
                errors.push(FieldError::new(
                    "payment_terms_days",
                    "payment_terms_days must be between 0 and 365",
                ));
            }
        }

        AppError::from_fields(errors)
    }
}
