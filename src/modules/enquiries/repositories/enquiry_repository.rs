use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, MySql, MySqlPool, Transaction};

use crate::core::numbering::next_document_number;
use crate::core::status::parse_stored;
use crate::core::{AppError, DocumentSeries, ListQuery, Result};
use crate::modules::enquiries::models::{Enquiry, EnquiryItem, EnquiryStatus};

#[async_trait]
pub trait EnquiryRepository: Send + Sync {
    async fn next_number(&self, date: NaiveDate) -> Result<String>;

    /// Insert header and items in one transaction
    async fn create(&self, enquiry: &Enquiry, items: &[EnquiryItem]) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Enquiry>>;

    async fn items(&self, enquiry_id: &str) -> Result<Vec<EnquiryItem>>;

    async fn list(&self, query: &ListQuery) -> Result<Vec<Enquiry>>;

    async fn update_header(&self, enquiry: &Enquiry) -> Result<()>;

    async fn update_status(&self, id: &str, status: EnquiryStatus) -> Result<()>;

    /// Replace the full item list
    async fn save_items(&self, enquiry_id: &str, items: &[EnquiryItem]) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

pub struct MySqlEnquiryRepository {
    pool: MySqlPool,
}

impl MySqlEnquiryRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn insert_items(
        tx: &mut Transaction<'_, MySql>,
        items: &[EnquiryItem],
    ) -> Result<()> {
        for item in items {
            sqlx::query(
                r#"
                INSERT INTO enquiry_items (
                    id, enquiry_id, line_number, inventory_item_id, description,
                    quantity, unit, notes
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&item.id)
            .bind(&item.enquiry_id)
            .bind(item.line_number)
            .bind(&item.inventory_item_id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(&item.unit)
            .bind(&item.notes)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::from_write(e, "Enquiry item"))?;
        }
        Ok(())
    }
}

const ENQUIRY_COLUMNS: &str = "id, enquiry_number, customer_id, enquiry_date, required_by, \
     subject, reference, status, notes, created_at, updated_at";

#[derive(Debug, FromRow)]
struct EnquiryRow {
    id: String,
    enquiry_number: String,
    customer_id: String,
    enquiry_date: NaiveDate,
    required_by: Option<NaiveDate>,
    subject: String,
    reference: Option<String>,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EnquiryRow {
    fn into_enquiry(self) -> Result<Enquiry> {
        Ok(Enquiry {
            id: self.id,
            enquiry_number: self.enquiry_number,
            customer_id: self.customer_id,
            enquiry_date: self.enquiry_date,
            required_by: self.required_by,
            subject: self.subject,
            reference: self.reference,
            status: parse_stored(&self.status)?,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct EnquiryItemRow {
    id: String,
    enquiry_id: String,
    line_number: i32,
    inventory_item_id: Option<String>,
    description: String,
    quantity: Decimal,
    unit: String,
    notes: Option<String>,
}

impl From<EnquiryItemRow> for EnquiryItem {
    fn from(row: EnquiryItemRow) -> Self {
        Self {
            id: row.id,
            enquiry_id: row.enquiry_id,
            line_number: row.line_number,
            inventory_item_id: row.inventory_item_id,
            description: row.description,
            quantity: row.quantity,
            unit: row.unit,
            notes: row.notes,
        }
    }
}

#[async_trait]
impl EnquiryRepository for MySqlEnquiryRepository {
    async fn next_number(&self, date: NaiveDate) -> Result<String> {
        next_document_number(
            &self.pool,
            "enquiries",
            "enquiry_number",
            DocumentSeries::Enquiry,
            date,
        )
        .await
    }

    async fn create(&self, enquiry: &Enquiry, items: &[EnquiryItem]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO enquiries (
                id, enquiry_number, customer_id, enquiry_date, required_by,
                subject, reference, status, notes, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&enquiry.id)
        .bind(&enquiry.enquiry_number)
        .bind(&enquiry.customer_id)
        .bind(enquiry.enquiry_date)
        .bind(enquiry.required_by)
        .bind(&enquiry.subject)
        .bind(&enquiry.reference)
        .bind(enquiry.status.as_str())
        .bind(&enquiry.notes)
        .bind(enquiry.created_at)
        .bind(enquiry.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, &format!("Enquiry '{}'", enquiry.enquiry_number)))?;

        Self::insert_items(&mut tx, items).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Enquiry>> {
        let sql = format!("SELECT {} FROM enquiries WHERE id = ?", ENQUIRY_COLUMNS);
        let row = sqlx::query_as::<_, EnquiryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(EnquiryRow::into_enquiry).transpose()
    }

    async fn items(&self, enquiry_id: &str) -> Result<Vec<EnquiryItem>> {
        let rows = sqlx::query_as::<_, EnquiryItemRow>(
            r#"
            SELECT id, enquiry_id, line_number, inventory_item_id, description,
                   quantity, unit, notes
            FROM enquiry_items
            WHERE enquiry_id = ?
            ORDER BY line_number ASC
            "#,
        )
        .bind(enquiry_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(EnquiryItem::from).collect())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Enquiry>> {
        let pattern = query.search_pattern();
        let sql = format!(
            r#"
            SELECT {}
            FROM enquiries
            WHERE (? IS NULL OR status = ?)
              AND (? IS NULL OR customer_id = ?)
              AND (? IS NULL OR enquiry_number LIKE ? OR subject LIKE ?)
            ORDER BY enquiry_date DESC, enquiry_number DESC
            LIMIT ? OFFSET ?
            "#,
            ENQUIRY_COLUMNS
        );

        let rows = sqlx::query_as::<_, EnquiryRow>(&sql)
            .bind(&query.status)
            .bind(&query.status)
            .bind(&query.customer_id)
            .bind(&query.customer_id)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(EnquiryRow::into_enquiry).collect()
    }

    async fn update_header(&self, enquiry: &Enquiry) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE enquiries
            SET subject = ?, required_by = ?, reference = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&enquiry.subject)
        .bind(enquiry.required_by)
        .bind(&enquiry.reference)
        .bind(&enquiry.notes)
        .bind(enquiry.updated_at)
        .bind(&enquiry.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_status(&self, id: &str, status: EnquiryStatus) -> Result<()> {
        let result = sqlx::query(
            "UPDATE enquiries SET status = ?, updated_at = NOW() WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Enquiry '{}' not found", id)));
        }
        Ok(())
    }

    async fn save_items(&self, enquiry_id: &str, items: &[EnquiryItem]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM enquiry_items WHERE enquiry_id = ?")
            .bind(enquiry_id)
            .execute(&mut *tx)
            .await?;
        Self::insert_items(&mut tx, items).await?;
        sqlx::query("UPDATE enquiries SET updated_at = NOW() WHERE id = ?")
            .bind(enquiry_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM enquiry_items WHERE enquiry_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM enquiries WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, &format!("Enquiry '{}'", id)))?;

        tx.commit().await?;
        Ok(())
    }
}
