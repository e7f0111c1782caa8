use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::core::numbering::next_document_number;
use crate::core::status::parse_stored;
use crate::core::{AppError, DocumentSeries, ListQuery, Result};
use crate::modules::inventory::repositories::apply_stock_changes;
use crate::modules::inventory::{StockChange, StockLine, StockLineTable};
use crate::modules::material_receipts::models::{MaterialReceipt, ReceiptStatus};
use crate::modules::supplier_lpos::LpoStatus;

pub const RECEIPT_LINES: StockLineTable = StockLineTable::new(
    "material_receipt_items",
    "material_receipt_id",
    Some("supplier_lpo_item_id"),
);

#[async_trait]
pub trait MaterialReceiptRepository: Send + Sync {
    async fn next_number(&self, date: NaiveDate) -> Result<String>;

    async fn create(&self, receipt: &MaterialReceipt, lines: &[StockLine]) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<MaterialReceipt>>;

    async fn lines(&self, receipt_id: &str) -> Result<Vec<StockLine>>;

    async fn list(&self, query: &ListQuery) -> Result<Vec<MaterialReceipt>>;

    /// Lines of every non-cancelled receipt against an LPO
    async fn lines_for_lpo(&self, lpo_id: &str) -> Result<Vec<StockLine>>;

    /// Mark completed and book the stock in one transaction
    async fn complete(&self, receipt: &MaterialReceipt, changes: &[StockChange]) -> Result<()>;

    async fn cancel(&self, id: &str) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

pub struct MySqlMaterialReceiptRepository {
    pool: MySqlPool,
}

impl MySqlMaterialReceiptRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const RECEIPT_COLUMNS: &str = "id, receipt_number, supplier_id, supplier_lpo_id, receipt_date, \
     delivery_note, received_by, status, notes, completed_at, created_at, updated_at";

#[derive(Debug, FromRow)]
struct ReceiptRow {
    id: String,
    receipt_number: String,
    supplier_id: String,
    supplier_lpo_id: Option<String>,
    receipt_date: NaiveDate,
    delivery_note: Option<String>,
    received_by: Option<String>,
    status: String,
    notes: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReceiptRow {
    fn into_receipt(self) -> Result<MaterialReceipt> {
        Ok(MaterialReceipt {
            id: self.id,
            receipt_number: self.receipt_number,
            supplier_id: self.supplier_id,
            supplier_lpo_id: self.supplier_lpo_id,
            receipt_date: self.receipt_date,
            delivery_note: self.delivery_note,
            received_by: self.received_by,
            status: parse_stored(&self.status)?,
            notes: self.notes,
            completed_at: self.completed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl MaterialReceiptRepository for MySqlMaterialReceiptRepository {
    async fn next_number(&self, date: NaiveDate) -> Result<String> {
        next_document_number(
            &self.pool,
            "material_receipts",
            "receipt_number",
            DocumentSeries::MaterialReceipt,
            date,
        )
        .await
    }

    async fn create(&self, receipt: &MaterialReceipt, lines: &[StockLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO material_receipts ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            RECEIPT_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&receipt.id)
            .bind(&receipt.receipt_number)
            .bind(&receipt.supplier_id)
            .bind(&receipt.supplier_lpo_id)
            .bind(receipt.receipt_date)
            .bind(&receipt.delivery_note)
            .bind(&receipt.received_by)
            .bind(receipt.status.as_str())
            .bind(&receipt.notes)
            .bind(receipt.completed_at)
            .bind(receipt.created_at)
            .bind(receipt.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::from_write(e, &format!("Material receipt '{}'", receipt.receipt_number))
            })?;

        RECEIPT_LINES.insert_all(&mut tx, lines).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<MaterialReceipt>> {
        let sql = format!("SELECT {} FROM material_receipts WHERE id = ?", RECEIPT_COLUMNS);
        let row = sqlx::query_as::<_, ReceiptRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ReceiptRow::into_receipt).transpose()
    }

    async fn lines(&self, receipt_id: &str) -> Result<Vec<StockLine>> {
        RECEIPT_LINES.fetch(&self.pool, receipt_id).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<MaterialReceipt>> {
        let pattern = query.search_pattern();
        let sql = format!(
            r#"
            SELECT {}
            FROM material_receipts
            WHERE (? IS NULL OR status = ?)
              AND (? IS NULL OR supplier_id = ?)
              AND (? IS NULL OR receipt_number LIKE ? OR delivery_note LIKE ?)
            ORDER BY receipt_date DESC, receipt_number DESC
            LIMIT ? OFFSET ?
            "#,
            RECEIPT_COLUMNS
        );

        let rows = sqlx::query_as::<_, ReceiptRow>(&sql)
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

        rows.into_iter().map(ReceiptRow::into_receipt).collect()
    }

    async fn lines_for_lpo(&self, lpo_id: &str) -> Result<Vec<StockLine>> {
        RECEIPT_LINES
            .fetch_where(
                &self.pool,
                "SELECT id FROM material_receipts WHERE supplier_lpo_id = ? AND status <> 'cancelled'",
                lpo_id,
            )
            .await
    }

    async fn complete(&self, receipt: &MaterialReceipt, changes: &[StockChange]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Hold the LPO row so it cannot be cancelled while stock is booked against it
        if let Some(lpo_id) = &receipt.supplier_lpo_id {
            let status: Option<String> =
                sqlx::query_scalar("SELECT status FROM supplier_lpos WHERE id = ? FOR UPDATE")
                    .bind(lpo_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let released = match status {
                Some(status) => parse_stored::<LpoStatus>(&status)?.is_released(),
                None => false,
            };
            if !released {
                tx.rollback().await?;
                return Err(AppError::InvalidTransition(format!(
                    "Supplier LPO of material receipt {} is no longer open for receiving",
                    receipt.receipt_number
                )));
            }
        }

        let result = sqlx::query(
            r#"
            UPDATE material_receipts
            SET status = 'completed', completed_at = ?, updated_at = ?
            WHERE id = ? AND status = 'draft'
            "#,
        )
        .bind(receipt.completed_at)
        .bind(receipt.updated_at)
        .bind(&receipt.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::conflict(format!(
                "Material receipt {} is no longer a draft",
                receipt.receipt_number
            )));
        }

        apply_stock_changes(&mut tx, "material_receipt", changes).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn cancel(&self, id: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE material_receipts SET status = ?, updated_at = NOW() WHERE id = ? AND status = 'draft'",
        )
        .bind(ReceiptStatus::Cancelled.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::conflict(format!(
                "Material receipt '{}' is no longer a draft",
                id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        RECEIPT_LINES.delete_all(&mut tx, id).await?;
        sqlx::query("DELETE FROM material_receipts WHERE id = ? AND status = 'draft'")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, &format!("Material receipt '{}'", id)))?;
        tx.commit().await?;
        Ok(())
    }
}
