use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, MySql, MySqlPool, Transaction};

use crate::core::numbering::next_document_number;
use crate::core::status::parse_stored;
use crate::core::{
    AppError, DocumentSeries, DocumentTotals, LineTable, ListQuery, PricedLine, Result,
};
use crate::modules::supplier_lpos::models::{LpoStatus, LpoStatusChange, SupplierLpo};

pub const SUPPLIER_LPO_LINES: LineTable = LineTable::new("supplier_lpo_items", "supplier_lpo_id");

#[async_trait]
pub trait SupplierLpoRepository: Send + Sync {
    async fn next_number(&self, date: NaiveDate) -> Result<String>;

    /// Insert header, lines and the opening history row
    async fn create(
        &self,
        lpo: &SupplierLpo,
        lines: &[PricedLine],
        opened: &LpoStatusChange,
    ) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<SupplierLpo>>;

    async fn lines(&self, lpo_id: &str) -> Result<Vec<PricedLine>>;

    async fn list(&self, query: &ListQuery) -> Result<Vec<SupplierLpo>>;

    /// Rewrite header, totals and lines; `change` records a status reset.
    /// Fails with a conflict when the stored status is no longer the one read.
    async fn update(
        &self,
        lpo: &SupplierLpo,
        lines: &[PricedLine],
        change: Option<&LpoStatusChange>,
    ) -> Result<()>;

    /// Persist a workflow step if the stored status is still `change.from_status`
    async fn transition(&self, lpo: &SupplierLpo, change: &LpoStatusChange) -> Result<()>;

    async fn history(&self, lpo_id: &str) -> Result<Vec<LpoStatusChange>>;

    async fn delete(&self, id: &str) -> Result<()>;
}

pub struct MySqlSupplierLpoRepository {
    pool: MySqlPool,
}

impl MySqlSupplierLpoRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn insert_history(
        tx: &mut Transaction<'_, MySql>,
        change: &LpoStatusChange,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO supplier_lpo_status_history (
                id, supplier_lpo_id, from_status, to_status, performed_by, notes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&change.id)
        .bind(&change.lpo_id)
        .bind(change.from_status.map(|s| s.as_str()))
        .bind(change.to_status.as_str())
        .bind(&change.performed_by)
        .bind(&change.notes)
        .bind(change.created_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn write_header(
        tx: &mut Transaction<'_, MySql>,
        lpo: &SupplierLpo,
        expected_status: Option<LpoStatus>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE supplier_lpos
            SET expected_delivery_date = ?, delivery_address = ?, payment_terms = ?,
                currency = ?, status = ?, subtotal = ?, discount_total = ?, tax_total = ?,
                total_amount = ?, notes = ?, terms = ?, submitted_at = ?, approved_by = ?,
                approved_at = ?, rejection_reason = ?, sent_at = ?, confirmed_at = ?,
                supplier_reference = ?, updated_at = ?
            WHERE id = ? AND (? IS NULL OR status = ?)
            "#,
        )
        .bind(lpo.expected_delivery_date)
        .bind(&lpo.delivery_address)
        .bind(&lpo.payment_terms)
        .bind(lpo.currency.code())
        .bind(lpo.status.as_str())
        .bind(lpo.totals.subtotal)
        .bind(lpo.totals.discount_total)
        .bind(lpo.totals.tax_total)
        .bind(lpo.totals.total_amount)
        .bind(&lpo.notes)
        .bind(&lpo.terms)
        .bind(lpo.submitted_at)
        .bind(&lpo.approved_by)
        .bind(lpo.approved_at)
        .bind(&lpo.rejection_reason)
        .bind(lpo.sent_at)
        .bind(lpo.confirmed_at)
        .bind(&lpo.supplier_reference)
        .bind(lpo.updated_at)
        .bind(&lpo.id)
        .bind(expected_status.map(|s| s.as_str()))
        .bind(expected_status.map(|s| s.as_str()))
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }
}

const LPO_COLUMNS: &str = "id, lpo_number, supplier_id, supplier_quote_id, lpo_date, \
     expected_delivery_date, delivery_address, payment_terms, currency, status, subtotal, \
     discount_total, tax_total, total_amount, notes, terms, created_by, submitted_at, \
     approved_by, approved_at, rejection_reason, sent_at, confirmed_at, supplier_reference, \
     created_at, updated_at";

#[derive(Debug, FromRow)]
struct SupplierLpoRow {
    id: String,
    lpo_number: String,
    supplier_id: String,
    supplier_quote_id: Option<String>,
    lpo_date: NaiveDate,
    expected_delivery_date: Option<NaiveDate>,
    delivery_address: Option<String>,
    payment_terms: Option<String>,
    currency: String,
    status: String,
    subtotal: Decimal,
    discount_total: Decimal,
    tax_total: Decimal,
    total_amount: Decimal,
    notes: Option<String>,
    terms: Option<String>,
    created_by: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
    approved_by: Option<String>,
    approved_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
    sent_at: Option<DateTime<Utc>>,
    confirmed_at: Option<DateTime<Utc>>,
    supplier_reference: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SupplierLpoRow {
    fn into_lpo(self) -> Result<SupplierLpo> {
        Ok(SupplierLpo {
            id: self.id,
            lpo_number: self.lpo_number,
            supplier_id: self.supplier_id,
            supplier_quote_id: self.supplier_quote_id,
            lpo_date: self.lpo_date,
            expected_delivery_date: self.expected_delivery_date,
            delivery_address: self.delivery_address,
            payment_terms: self.payment_terms,
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
            created_by: self.created_by,
            submitted_at: self.submitted_at,
            approved_by: self.approved_by,
            approved_at: self.approved_at,
            rejection_reason: self.rejection_reason,
            sent_at: self.sent_at,
            confirmed_at: self.confirmed_at,
            supplier_reference: self.supplier_reference,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct StatusChangeRow {
    id: String,
    supplier_lpo_id: String,
    from_status: Option<String>,
    to_status: String,
    performed_by: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl StatusChangeRow {
    fn into_change(self) -> Result<LpoStatusChange> {
        Ok(LpoStatusChange {
            id: self.id,
            lpo_id: self.supplier_lpo_id,
            from_status: self
                .from_status
                .as_deref()
                .map(parse_stored::<LpoStatus>)
                .transpose()?,
            to_status: parse_stored(&self.to_status)?,
            performed_by: self.performed_by,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl SupplierLpoRepository for MySqlSupplierLpoRepository {
    async fn next_number(&self, date: NaiveDate) -> Result<String> {
        next_document_number(
            &self.pool,
            "supplier_lpos",
            "lpo_number",
            DocumentSeries::SupplierLpo,
            date,
        )
        .await
    }

    async fn create(
        &self,
        lpo: &SupplierLpo,
        lines: &[PricedLine],
        opened: &LpoStatusChange,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO supplier_lpos ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            LPO_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&lpo.id)
            .bind(&lpo.lpo_number)
            .bind(&lpo.supplier_id)
            .bind(&lpo.supplier_quote_id)
            .bind(lpo.lpo_date)
            .bind(lpo.expected_delivery_date)
            .bind(&lpo.delivery_address)
            .bind(&lpo.payment_terms)
            .bind(lpo.currency.code())
            .bind(lpo.status.as_str())
            .bind(lpo.totals.subtotal)
            .bind(lpo.totals.discount_total)
            .bind(lpo.totals.tax_total)
            .bind(lpo.totals.total_amount)
            .bind(&lpo.notes)
            .bind(&lpo.terms)
            .bind(&lpo.created_by)
            .bind(lpo.submitted_at)
            .bind(&lpo.approved_by)
            .bind(lpo.approved_at)
            .bind(&lpo.rejection_reason)
            .bind(lpo.sent_at)
            .bind(lpo.confirmed_at)
            .bind(&lpo.supplier_reference)
            .bind(lpo.created_at)
            .bind(lpo.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, &format!("Supplier LPO '{}'", lpo.lpo_number)))?;

        SUPPLIER_LPO_LINES.insert_all(&mut tx, lines).await?;
        Self::insert_history(&mut tx, opened).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<SupplierLpo>> {
        let sql = format!("SELECT {} FROM supplier_lpos WHERE id = ?", LPO_COLUMNS);
        let row = sqlx::query_as::<_, SupplierLpoRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(SupplierLpoRow::into_lpo).transpose()
    }

    async fn lines(&self, lpo_id: &str) -> Result<Vec<PricedLine>> {
        SUPPLIER_LPO_LINES.fetch(&self.pool, lpo_id).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<SupplierLpo>> {
        let pattern = query.search_pattern();
        let sql = format!(
            r#"
            SELECT {}
            FROM supplier_lpos
            WHERE (? IS NULL OR status = ?)
              AND (? IS NULL OR supplier_id = ?)
              AND (? IS NULL OR lpo_number LIKE ? OR supplier_reference LIKE ?)
            ORDER BY lpo_date DESC, lpo_number DESC
            LIMIT ? OFFSET ?
            "#,
            LPO_COLUMNS
        );

        let rows = sqlx::query_as::<_, SupplierLpoRow>(&sql)
            .bind(&query.status)
            .bind(&query.status)
            .bind(&query.supplier_id)
            .bind(&query.supplier_id)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(SupplierLpoRow::into_lpo).collect()
    }

    async fn update(
        &self,
        lpo: &SupplierLpo,
        lines: &[PricedLine],
        change: Option<&LpoStatusChange>,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Only write over the status the caller read; a concurrent submit wins
        let expected = change.and_then(|c| c.from_status).unwrap_or(lpo.status);
        if Self::write_header(&mut tx, lpo, Some(expected)).await? == 0 {
            tx.rollback().await?;
            return Err(AppError::conflict(format!(
                "Supplier LPO {} was changed by another request",
                lpo.lpo_number
            )));
        }
        SUPPLIER_LPO_LINES.replace_all(&mut tx, &lpo.id, lines).await?;
        if let Some(change) = change {
            Self::insert_history(&mut tx, change).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn transition(&self, lpo: &SupplierLpo, change: &LpoStatusChange) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        if Self::write_header(&mut tx, lpo, change.from_status).await? == 0 {
            tx.rollback().await?;
            return Err(AppError::conflict(format!(
                "Supplier LPO {} is no longer {}",
                lpo.lpo_number,
                change.from_status.map(|s| s.as_str()).unwrap_or("present")
            )));
        }
        Self::insert_history(&mut tx, change).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn history(&self, lpo_id: &str) -> Result<Vec<LpoStatusChange>> {
        let rows = sqlx::query_as::<_, StatusChangeRow>(
            r#"
            SELECT id, supplier_lpo_id, from_status, to_status, performed_by, notes, created_at
            FROM supplier_lpo_status_history
            WHERE supplier_lpo_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(lpo_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StatusChangeRow::into_change).collect()
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for sql in [
            "DELETE FROM supplier_lpo_status_history WHERE supplier_lpo_id = ?",
            "DELETE FROM supplier_lpo_items WHERE supplier_lpo_id = ?",
        ] {
            sqlx::query(sql).bind(id).execute(&mut *tx).await?;
        }
        sqlx::query("DELETE FROM supplier_lpos WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, &format!("Supplier LPO '{}'", id)))?;

        tx.commit().await?;
        Ok(())
    }
}
