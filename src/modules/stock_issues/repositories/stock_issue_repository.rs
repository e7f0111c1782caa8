use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::core::numbering::next_document_number;
use crate::core::status::parse_stored;
use crate::core::{AppError, DocumentSeries, ListQuery, Result};
use crate::modules::inventory::repositories::apply_stock_changes;
use crate::modules::inventory::{StockChange, StockLine, StockLineTable};
use crate::modules::stock_issues::models::{IssueStatus, StockIssue};

pub const ISSUE_LINES: StockLineTable =
    StockLineTable::new("stock_issue_items", "stock_issue_id", None);

#[async_trait]
pub trait StockIssueRepository: Send + Sync {
    async fn next_number(&self, date: NaiveDate) -> Result<String>;

    async fn create(&self, issue: &StockIssue, lines: &[StockLine]) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<StockIssue>>;

    async fn lines(&self, issue_id: &str) -> Result<Vec<StockLine>>;

    async fn list(&self, query: &ListQuery) -> Result<Vec<StockIssue>>;

    /// Mark issued and take the stock out in one transaction
    async fn issue(&self, issue: &StockIssue, changes: &[StockChange]) -> Result<()>;

    async fn cancel(&self, id: &str) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

pub struct MySqlStockIssueRepository {
    pool: MySqlPool,
}

impl MySqlStockIssueRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const ISSUE_COLUMNS: &str = "id, issue_number, issue_date, issued_to, sales_order_id, purpose, \
     status, notes, issued_at, created_at, updated_at";

#[derive(Debug, FromRow)]
struct IssueRow {
    id: String,
    issue_number: String,
    issue_date: NaiveDate,
    issued_to: Option<String>,
    sales_order_id: Option<String>,
    purpose: Option<String>,
    status: String,
    notes: Option<String>,
    issued_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl IssueRow {
    fn into_issue(self) -> Result<StockIssue> {
        Ok(StockIssue {
            id: self.id,
            issue_number: self.issue_number,
            issue_date: self.issue_date,
            issued_to: self.issued_to,
            sales_order_id: self.sales_order_id,
            purpose: self.purpose,
            status: parse_stored(&self.status)?,
            notes: self.notes,
            issued_at: self.issued_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl StockIssueRepository for MySqlStockIssueRepository {
    async fn next_number(&self, date: NaiveDate) -> Result<String> {
        next_document_number(
            &self.pool,
            "stock_issues",
            "issue_number",
            DocumentSeries::StockIssue,
            date,
        )
        .await
    }

    async fn create(&self, issue: &StockIssue, lines: &[StockLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO stock_issues ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            ISSUE_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&issue.id)
            .bind(&issue.issue_number)
            .bind(issue.issue_date)
            .bind(&issue.issued_to)
            .bind(&issue.sales_order_id)
            .bind(&issue.purpose)
            .bind(issue.status.as_str())
            .bind(&issue.notes)
            .bind(issue.issued_at)
            .bind(issue.created_at)
            .bind(issue.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, &format!("Stock issue '{}'", issue.issue_number)))?;

        ISSUE_LINES.insert_all(&mut tx, lines).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<StockIssue>> {
        let sql = format!("SELECT {} FROM stock_issues WHERE id = ?", ISSUE_COLUMNS);
        let row = sqlx::query_as::<_, IssueRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(IssueRow::into_issue).transpose()
    }

    async fn lines(&self, issue_id: &str) -> Result<Vec<StockLine>> {
        ISSUE_LINES.fetch(&self.pool, issue_id).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<StockIssue>> {
        let pattern = query.search_pattern();
        let sql = format!(
            r#"
            SELECT {}
            FROM stock_issues
            WHERE (? IS NULL OR status = ?)
              AND (? IS NULL OR issue_number LIKE ? OR issued_to LIKE ? OR purpose LIKE ?)
            ORDER BY issue_date DESC, issue_number DESC
            LIMIT ? OFFSET ?
            "#,
            ISSUE_COLUMNS
        );

        let rows = sqlx::query_as::<_, IssueRow>(&sql)
            .bind(&query.status)
            .bind(&query.status)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(IssueRow::into_issue).collect()
    }

    async fn issue(&self, issue: &StockIssue, changes: &[StockChange]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE stock_issues
            SET status = 'issued', issued_at = ?, updated_at = ?
            WHERE id = ? AND status = 'draft'
            "#,
        )
        .bind(issue.issued_at)
        .bind(issue.updated_at)
        .bind(&issue.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::conflict(format!(
                "Stock issue {} is no longer a draft",
                issue.issue_number
            )));
        }

        // Dropping the transaction on InsufficientStock rolls the status back too
        apply_stock_changes(&mut tx, "stock_issue", changes).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn cancel(&self, id: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE stock_issues SET status = ?, updated_at = NOW() WHERE id = ? AND status = 'draft'",
        )
        .bind(IssueStatus::Cancelled.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::conflict(format!(
                "Stock issue '{}' is no longer a draft",
                id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        ISSUE_LINES.delete_all(&mut tx, id).await?;
        sqlx::query("DELETE FROM stock_issues WHERE id = ? AND status = 'draft'")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, &format!("Stock issue '{}'", id)))?;
        tx.commit().await?;
        Ok(())
    }
}
