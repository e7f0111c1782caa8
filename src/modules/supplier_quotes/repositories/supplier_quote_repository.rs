use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, MySqlPool};

use crate::core::numbering::next_document_number;
use crate::core::status::parse_stored;
use crate::core::{
    AppError, DocumentSeries, DocumentTotals, LineTable, ListQuery, PricedLine, Result,
};
use crate::modules::supplier_quotes::models::{SupplierQuote, SupplierQuoteStatus};

pub const SUPPLIER_QUOTE_LINES: LineTable =
    LineTable::new("supplier_quote_items", "supplier_quote_id");

#[async_trait]
pub trait SupplierQuoteRepository: Send + Sync {
    async fn next_number(&self, date: NaiveDate) -> Result<String>;

    async fn create(&self, quote: &SupplierQuote, lines: &[PricedLine]) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<SupplierQuote>>;

    async fn lines(&self, quote_id: &str) -> Result<Vec<PricedLine>>;

    async fn list(&self, query: &ListQuery) -> Result<Vec<SupplierQuote>>;

    /// Quotes received for an enquiry, cheapest first
    async fn for_enquiry(&self, enquiry_id: &str) -> Result<Vec<SupplierQuote>>;

    async fn update_header(&self, quote: &SupplierQuote) -> Result<()>;

    /// Replace lines and store the recomputed totals
    async fn save_lines(
        &self,
        quote_id: &str,
        totals: &DocumentTotals,
        lines: &[PricedLine],
    ) -> Result<()>;

    async fn update_status(&self, id: &str, status: SupplierQuoteStatus) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

pub struct MySqlSupplierQuoteRepository {
    pool: MySqlPool,
}

impl MySqlSupplierQuoteRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const QUOTE_COLUMNS: &str = "id, quote_number, supplier_id, enquiry_id, quote_date, valid_until, \
     supplier_reference, currency, status, subtotal, discount_total, tax_total, total_amount, \
     notes, created_at, updated_at";

#[derive(Debug, FromRow)]
struct SupplierQuoteRow {
    id: String,
    quote_number: String,
    supplier_id: String,
    enquiry_id: Option<String>,
    quote_date: NaiveDate,
    valid_until: Option<NaiveDate>,
    supplier_reference: Option<String>,
    currency: String,
    status: String,
    subtotal: Decimal,
    discount_total: Decimal,
    tax_total: Decimal,
    total_amount: Decimal,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SupplierQuoteRow {
    fn into_quote(self) -> Result<SupplierQuote> {
        Ok(SupplierQuote {
            id: self.id,
            quote_number: self.quote_number,
            supplier_id: self.supplier_id,
            enquiry_id: self.enquiry_id,
            quote_date: self.quote_date,
            valid_until: self.valid_until,
            supplier_reference: self.supplier_reference,
            currency: parse_stored(&self.currency)?,
            status: parse_stored(&self.status)?,
            totals: DocumentTotals {
                subtotal: self.subtotal,
                discount_total: self.discount_total,
                tax_total: self.tax_total,
                total_amount: self.total_amount,
            },
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl SupplierQuoteRepository for MySqlSupplierQuoteRepository {
    async fn next_number(&self, date: NaiveDate) -> Result<String> {
        next_document_number(
            &self.pool,
            "supplier_quotes",
            "quote_number",
            DocumentSeries::SupplierQuote,
            date,
        )
        .await
    }

    async fn create(&self, quote: &SupplierQuote, lines: &[PricedLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO supplier_quotes ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            QUOTE_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&quote.id)
            .bind(&quote.quote_number)
            .bind(&quote.supplier_id)
            .bind(&quote.enquiry_id)
            .bind(quote.quote_date)
            .bind(quote.valid_until)
            .bind(&quote.supplier_reference)
            .bind(quote.currency.code())
            .bind(quote.status.as_str())
            .bind(quote.totals.subtotal)
            .bind(quote.totals.discount_total)
            .bind(quote.totals.tax_total)
            .bind(quote.totals.total_amount)
            .bind(&quote.notes)
            .bind(quote.created_at)
            .bind(quote.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::from_write(e, &format!("Supplier quote '{}'", quote.quote_number))
            })?;

        SUPPLIER_QUOTE_LINES.insert_all(&mut tx, lines).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<SupplierQuote>> {
        let sql = format!("SELECT {} FROM supplier_quotes WHERE id = ?", QUOTE_COLUMNS);
        let row = sqlx::query_as::<_, SupplierQuoteRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(SupplierQuoteRow::into_quote).transpose()
    }

    async fn lines(&self, quote_id: &str) -> Result<Vec<PricedLine>> {
        SUPPLIER_QUOTE_LINES.fetch(&self.pool, quote_id).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<SupplierQuote>> {
        let pattern = query.search_pattern();
        let sql = format!(
            r#"
            SELECT {}
            FROM supplier_quotes
            WHERE (? IS NULL OR status = ?)
              AND (? IS NULL OR supplier_id = ?)
              AND (? IS NULL OR enquiry_id = ?)
              AND (? IS NULL OR quote_number LIKE ? OR supplier_reference LIKE ?)
            ORDER BY quote_date DESC, quote_number DESC
            LIMIT ? OFFSET ?
            "#,
            QUOTE_COLUMNS
        );

        let rows = sqlx::query_as::<_, SupplierQuoteRow>(&sql)
            .bind(&query.status)
            .bind(&query.status)
            .bind(&query.supplier_id)
            .bind(&query.supplier_id)
            .bind(&query.enquiry_id)
            .bind(&query.enquiry_id)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(SupplierQuoteRow::into_quote).collect()
    }

    async fn for_enquiry(&self, enquiry_id: &str) -> Result<Vec<SupplierQuote>> {
        let sql = format!(
            "SELECT {} FROM supplier_quotes WHERE enquiry_id = ? ORDER BY currency ASC, total_amount ASC, quote_date ASC",
            QUOTE_COLUMNS
        );
        let rows = sqlx::query_as::<_, SupplierQuoteRow>(&sql)
            .bind(enquiry_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(SupplierQuoteRow::into_quote).collect()
    }

    async fn update_header(&self, quote: &SupplierQuote) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE supplier_quotes
            SET valid_until = ?, supplier_reference = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(quote.valid_until)
        .bind(&quote.supplier_reference)
        .bind(&quote.notes)
        .bind(quote.updated_at)
        .bind(&quote.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_lines(
        &self,
        quote_id: &str,
        totals: &DocumentTotals,
        lines: &[PricedLine],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        SUPPLIER_QUOTE_LINES.replace_all(&mut tx, quote_id, lines).await?;
        sqlx::query(
            r#"
            UPDATE supplier_quotes
            SET subtotal = ?, discount_total = ?, tax_total = ?, total_amount = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(totals.subtotal)
        .bind(totals.discount_total)
        .bind(totals.tax_total)
        .bind(totals.total_amount)
        .bind(quote_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_status(&self, id: &str, status: SupplierQuoteStatus) -> Result<()> {
        let result = sqlx::query(
            "UPDATE supplier_quotes SET status = ?, updated_at = NOW() WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Supplier quote '{}' not found", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM supplier_quote_items WHERE supplier_quote_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM supplier_quotes WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, &format!("Supplier quote '{}'", id)))?;

        tx.commit().await?;
        Ok(())
    }
}
