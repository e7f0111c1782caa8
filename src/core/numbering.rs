use chrono::{Datelike, NaiveDate};
use sqlx::MySqlPool;

use crate::core::Result;

/// Document series and their number prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSeries {
    Enquiry,
    SupplierQuote,
    Quotation,
    SalesOrder,
    SupplierLpo,
    MaterialReceipt,
    ReceiptReturn,
    StockIssue,
    PurchaseInvoice,
}

impl DocumentSeries {
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentSeries::Enquiry => "ENQ",
            DocumentSeries::SupplierQuote => "SQ",
            DocumentSeries::Quotation => "QT",
            DocumentSeries::SalesOrder => "SO",
            DocumentSeries::SupplierLpo => "LPO",
            DocumentSeries::MaterialReceipt => "GRN",
            DocumentSeries::ReceiptReturn => "RTN",
            DocumentSeries::StockIssue => "SI",
            DocumentSeries::PurchaseInvoice => "PI",
        }
    }

    /// `LPO-2026-0007` for the 7th LPO dated in 2026
    pub fn format(&self, date: NaiveDate, sequence: i64) -> String {
        format!("{}-{}-{:04}", self.prefix(), date.year(), sequence)
    }

    /// SQL LIKE pattern matching every number of this series in the year
    pub fn year_pattern(&self, date: NaiveDate) -> String {
        format!("{}-{}-%", self.prefix(), date.year())
    }
}

/// Master data codes such as `CUST-0001`
pub fn master_code(prefix: &str, sequence: i64) -> String {
    format!("{}-{:04}", prefix, sequence)
}

/// Highest numeric suffix among `column` values matching `pattern`, plus one.
///
/// `table` and `column` are compile-time identifiers, never user input.
pub async fn next_sequence(
    pool: &MySqlPool,
    table: &str,
    column: &str,
    pattern: &str,
) -> Result<i64> {
    let sql = format!(
        "SELECT COALESCE(MAX(CAST(SUBSTRING_INDEX({column}, '-', -1) AS SIGNED)), 0) \
         FROM {table} WHERE {column} LIKE ?",
        column = column,
        table = table,
    );

    let current: i64 = sqlx::query_scalar(&sql)
        .bind(pattern)
        .fetch_one(pool)
        .await?;

    Ok(current + 1)
}

/// Next `PREFIX-YEAR-SEQ` number for a document table
pub async fn next_document_number(
    pool: &MySqlPool,
    table: &str,
    column: &str,
    series: DocumentSeries,
    date: NaiveDate,
) -> Result<String> {
    let sequence = next_sequence(pool, table, column, &series.year_pattern(date)).await?;
    Ok(series.format(date, sequence))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_number_format() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(DocumentSeries::SupplierLpo.format(date, 7), "LPO-2026-0007");
        assert_eq!(DocumentSeries::MaterialReceipt.format(date, 12345), "GRN-2026-12345");
        assert_eq!(DocumentSeries::Quotation.year_pattern(date), "QT-2026-%");
    }

    #[test]
    fn test_master_code() {
        assert_eq!(master_code("CUST", 1), "CUST-0001");
    }
}
