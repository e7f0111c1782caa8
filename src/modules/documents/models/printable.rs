use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::{Currency, DocumentTotals, PricedLine};
use crate::string_enum;

string_enum! {
    /// Documents that can be rendered and attached to email
    pub enum DocumentType {
        Quotation => "quotation",
        SalesOrder => "sales_order",
        SupplierLpo => "supplier_lpo",
    }
}

/// Layout-independent content of a printed document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrintableDocument {
    /// Heading such as "QUOTATION"
    pub title: String,
    pub number: String,
    pub date: NaiveDate,
    /// Label/value pairs printed under the number (validity, reference, status)
    pub meta: Vec<(String, String)>,
    /// "Bill To", "Supplier", ...
    pub party_heading: String,
    pub party_lines: Vec<String>,
    pub currency: Currency,
    pub lines: Vec<PrintableLine>,
    pub totals: Option<DocumentTotals>,
    pub notes: Option<String>,
    pub terms: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrintableLine {
    pub line_number: i32,
    pub description: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_price: Option<Decimal>,
    pub line_total: Option<Decimal>,
}

impl From<&PricedLine> for PrintableLine {
    fn from(line: &PricedLine) -> Self {
        Self {
            line_number: line.line_number,
            description: line.description.clone(),
            quantity: line.quantity,
            unit: line.unit.clone(),
            unit_price: Some(line.unit_price),
            line_total: Some(line.line_total),
        }
    }
}

impl PrintableDocument {
    /// `QT-2026-0001.pdf`
    pub fn file_name(&self) -> String {
        let safe: String = self
            .number
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("{}.pdf", safe)
    }
}
