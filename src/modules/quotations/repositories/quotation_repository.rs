use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, MySqlPool};

use crate::core::numbering::next_document_number;
use crate::core::status::parse_stored;
use crate::core::{
    AppError, DocumentSeries, DocumentTotals, LineTable, ListQuery, PricedLine, Result,
};
use crate::modules::quotations::models::{Quotation, QuotationStatus};

pub const QUOTATION_LINES: LineTable = LineTable::new("quotation_items", "quotation_id");

#[async_trait]
pub trait QuotationRepository: Send + Sync {
    async fn next_number(&self, date: NaiveDate) -> Result<String>;

    async fn create(&self, quotation: &Quotation, lines: &[PricedLine]) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Quotation>>;

    async fn lines(&self, quotation_id: &str) -> Result<Vec<PricedLine>>;

    async fn list(&self, query: &ListQuery) -> Result<Vec<Quotation>>;

    /// Store header fields, totals and the full line list together
    async fn update(&self, quotation: &Quotation, lines: &[PricedLine]) -> Result<()>;

    async fn update_status(&self, id: &str, status: QuotationStatus) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

pub struct MySqlQuotationRepository {
    pool: MySqlPool,
}

impl MySqlQuotationRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const QUOTATION_COLUMNS: &str = "id, quotation_number, customer_id, enquiry_id, quotation_date, \
     valid_until, reference, currency, status, subtotal, discount_total, tax_total, total_amount, \
     notes, terms, sales_order_id, created_at, updated_at";

#[derive(Debug, FromRow)]
struct QuotationRow {
    id: String,
    quotation_number: String,
    customer_id: String,
    enquiry_id: Option<String>,
    quotation_date: NaiveDate,
    valid_until: NaiveDate,
    reference: Option<String>,
    currency: String,
    status: String,
    subtotal: Decimal,
    discount_total: Decimal,
    tax_total: Decimal,
    total_amount: Decimal,
    notes: Option<String>,
    terms: Option<String>,
    sales_order_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl QuotationRow {
    fn into_quotation(self) -> Result<Quotation> {
        Ok(Quotation {
            id: self.id,
            quotation_number: self.quotation_number,
            customer_id: self.customer_id,
            enquiry_id: self.enquiry_id,
            quotation_date: self.quotation_date,
            valid_until: self.valid_until,
            reference: self.reference,
            currency: parse_stored(&self.currency)?,
            status: parse_stored(&self.status)?,
            totals: DocumentTotals {
                subtotal: self.subtotal,
                discount_total: self.discount_total,
                tax_total: self.tax_total,
                total_amount: self.total_amount,
            },
            notes: self.notes,
            terms: self.terms,
            sales_order_id: self.sales_order_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl QuotationRepository for MySqlQuotationRepository {
    async fn next_number(&self, date: NaiveDate) -> Result<String> {
        next_document_number(
            &self.pool,
            "quotations",
            "quotation_number",
            DocumentSeries::Quotation,
            date,
        )
        .await
    }

    async fn create(&self, quotation: &Quotation, lines: &[PricedLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO quotations ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            QUOTATION_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&quotation.id)
            .bind(&quotation.quotation_number)
            .bind(&quotation.customer_id)
            .bind(&quotation.enquiry_id)
            .bind(quotation.quotation_date)
            .bind(quotation.valid_until)
            .bind(&quotation.reference)
            .bind(quotation.currency.code())
            .bind(quotation.status.as_str())
            .bind(quotation.totals.subtotal)
            .bind(quotation.totals.discount_total)
            .bind(quotation.totals.tax_total)
            .bind(quotation.totals.total_amount)
            .bind(&quotation.notes)
            .bind(&quotation.terms)
            .bind(&quotation.sales_order_id)
            .bind(quotation.created_at)
            .bind(quotation.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::from_write(e, &format!("Quotation '{}'", quotation.quotation_number))
            })?;

        QUOTATION_LINES.insert_all(&mut tx, lines).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Quotation>> {
        let sql = format!("SELECT {} FROM quotations WHERE id = ?", QUOTATION_COLUMNS);
        let row = sqlx::query_as::<_, QuotationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(QuotationRow::into_quotation).transpose()
    }

    async fn lines(&self, quotation_id: &str) -> Result<Vec<PricedLine>> {
        QUOTATION_LINES.fetch(&self.pool, quotation_id).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Quotation>> {
        let pattern = query.search_pattern();
        let sql = format!(
            r#"
            SELECT {}
            FROM quotations
            WHERE (? IS NULL OR status = ?)
              AND (? IS NULL OR customer_id = ?)
              AND (? IS NULL OR enquiry_id = ?)
              AND (? IS NULL OR quotation_number LIKE ? OR reference LIKE ?)
            ORDER BY quotation_date DESC, quotation_number DESC
            LIMIT ? OFFSET ?
            "#,
            QUOTATION_COLUMNS
        );

        let rows = sqlx::query_as::<_, QuotationRow>(&sql)
            .bind(&query.status)
            .bind(&query.status)
            .bind(&query.customer_id)
            .bind(&query.customer_id)
            .bind(&query.enquiry_id)
            .bind(&query.enquiry_id)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(QuotationRow::into_quotation).collect()
    }

    async fn update(&self, quotation: &Quotation, lines: &[PricedLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE quotations
            SET valid_until = ?, reference = ?, currency = ?, notes = ?, terms = ?,
                subtotal = ?, discount_total = ?, tax_total = ?, total_amount = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(quotation.valid_until)
        .bind(&quotation.reference)
        .bind(quotation.currency.code())
        .bind(&quotation.notes)
        .bind(&quotation.terms)
        .bind(quotation.totals.subtotal)
        .bind(quotation.totals.discount_total)
        .bind(quotation.totals.tax_total)
        .bind(quotation.totals.total_amount)
        .bind(quotation.updated_at)
        .bind(&quotation.id)
        .execute(&mut *tx)
        .await?;

        QUOTATION_LINES
            .replace_all(&mut tx, &quotation.id, lines)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_status(&self, id: &str, status: QuotationStatus) -> Result<()> {
        let result = sqlx::query("UPDATE quotations SET status = ?, updated_at = NOW() WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Quotation '{}' not found", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM quotation_items WHERE quotation_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM quotations WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, &format!("Quotation '{}'", id)))?;

        tx.commit().await?;
        Ok(())
    }
}
