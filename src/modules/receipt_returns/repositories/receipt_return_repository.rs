use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::core::numbering::next_document_number;
use crate::core::status::parse_stored;
use crate::core::{AppError, DocumentSeries, ListQuery, Result};
use crate::modules::inventory::repositories::apply_stock_changes;
use crate::modules::inventory::{StockChange, StockLine, StockLineTable};
use crate::modules::receipt_returns::models::{ReceiptReturn, ReturnStatus};

pub const RETURN_LINES: StockLineTable = StockLineTable::new(
    "receipt_return_items",
    "receipt_return_id",
    Some("material_receipt_item_id"),
);

#[async_trait]
pub trait ReceiptReturnRepository: Send + Sync {
    async fn next_number(&self, date: NaiveDate) -> Result<String>;

    async fn create(&self, receipt_return: &ReceiptReturn, lines: &[StockLine]) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<ReceiptReturn>>;

    async fn lines(&self, return_id: &str) -> Result<Vec<StockLine>>;

    async fn list(&self, query: &ListQuery) -> Result<Vec<ReceiptReturn>>;

    /// Lines of draft and completed returns against a receipt
    async fn lines_for_receipt(&self, receipt_id: &str) -> Result<Vec<StockLine>>;

    /// Mark completed and take the stock out in one transaction
    async fn complete(&self, receipt_return: &ReceiptReturn, changes: &[StockChange]) -> Result<()>;

    async fn cancel(&self, id: &str) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

pub struct MySqlReceiptReturnRepository {
    pool: MySqlPool,
}

impl MySqlReceiptReturnRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const RETURN_COLUMNS: &str = "id, return_number, material_receipt_id, supplier_id, return_date, \
     reason, status, notes, completed_at, created_at, updated_at";

#[derive(Debug, FromRow)]
struct ReturnRow {
    id: String,
    return_number: String,
    material_receipt_id: String,
    supplier_id: String,
    return_date: NaiveDate,
    reason: String,
    status: String,
    notes: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReturnRow {
    fn into_return(self) -> Result<ReceiptReturn> {
        Ok(ReceiptReturn {
            id: self.id,
            return_number: self.return_number,
            material_receipt_id: self.material_receipt_id,
            supplier_id: self.supplier_id,
            return_date: self.return_date,
            reason: self.reason,
            status: parse_stored(&self.status)?,
            notes: self.notes,
            completed_at: self.completed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl ReceiptReturnRepository for MySqlReceiptReturnRepository {
    async fn next_number(&self, date: NaiveDate) -> Result<String> {
        next_document_number(
            &self.pool,
            "receipt_returns",
            "return_number",
            DocumentSeries::ReceiptReturn,
            date,
        )
        .await
    }

    async fn create(&self, receipt_return: &ReceiptReturn, lines: &[StockLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO receipt_returns ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            RETURN_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&receipt_return.id)
            .bind(&receipt_return.return_number)
            .bind(&receipt_return.material_receipt_id)
            .bind(&receipt_return.supplier_id)
            .bind(receipt_return.return_date)
            .bind(&receipt_return.reason)
            .bind(receipt_return.status.as_str())
            .bind(&receipt_return.notes)
            .bind(receipt_return.completed_at)
            .bind(receipt_return.created_at)
            .bind(receipt_return.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::from_write(
                    e,
                    &format!("Receipt return '{}'", receipt_return.return_number),
                )
            })?;

        RETURN_LINES.insert_all(&mut tx, lines).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ReceiptReturn>> {
        let sql = format!("SELECT {} FROM receipt_returns WHERE id = ?", RETURN_COLUMNS);
        let row = sqlx::query_as::<_, ReturnRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ReturnRow::into_return).transpose()
    }

    async fn lines(&self, return_id: &str) -> Result<Vec<StockLine>> {
        RETURN_LINES.fetch(&self.pool, return_id).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<ReceiptReturn>> {
        let pattern = query.search_pattern();
        let sql = format!(
            r#"
            SELECT {}
            FROM receipt_returns
            WHERE (? IS NULL OR status = ?)
              AND (? IS NULL OR supplier_id = ?)
              AND (? IS NULL OR return_number LIKE ? OR reason LIKE ?)
            ORDER BY return_date DESC, return_number DESC
            LIMIT ? OFFSET ?
            "#,
            RETURN_COLUMNS
        );

        let rows = sqlx::query_as::<_, ReturnRow>(&sql)
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

        rows.into_iter().map(ReturnRow::into_return).collect()
    }

    async fn lines_for_receipt(&self, receipt_id: &str) -> Result<Vec<StockLine>> {
        RETURN_LINES
            .fetch_where(
                &self.pool,
                "SELECT id FROM receipt_returns WHERE material_receipt_id = ? AND status <> 'cancelled'",
                receipt_id,
            )
            .await
    }

    async fn complete(&self, receipt_return: &ReceiptReturn, changes: &[StockChange]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE receipt_returns
            SET status = 'completed', completed_at = ?, updated_at = ?
            WHERE id = ? AND status = 'draft'
            "#,
        )
        .bind(receipt_return.completed_at)
        .bind(receipt_return.updated_at)
        .bind(&receipt_return.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::conflict(format!(
                "Receipt return {} is no longer a draft",
                receipt_return.return_number
            )));
        }

        apply_stock_changes(&mut tx, "receipt_return", changes).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn cancel(&self, id: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE receipt_returns SET status = ?, updated_at = NOW() WHERE id = ? AND status = 'draft'",
        )
        .bind(ReturnStatus::Cancelled.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::conflict(format!(
                "Receipt return '{}' is no longer a draft",
                id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        RETURN_LINES.delete_all(&mut tx, id).await?;
        sqlx::query("DELETE FROM receipt_returns WHERE id = ? AND status = 'draft'")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, &format!("Receipt return '{}'", id)))?;
        tx.commit().await?;
        Ok(())
    }
}
