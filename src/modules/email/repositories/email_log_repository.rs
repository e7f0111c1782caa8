use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::core::status::parse_stored;
use crate::core::{ListQuery, Result};
use crate::modules::documents::DocumentType;
use crate::modules::email::models::EmailLog;

#[async_trait]
pub trait EmailLogRepository: Send + Sync {
    async fn record(&self, log: &EmailLog) -> Result<()>;

    async fn list(&self, query: &ListQuery) -> Result<Vec<EmailLog>>;
}

pub struct MySqlEmailLogRepository {
    pool: MySqlPool,
}

impl MySqlEmailLogRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EmailLogRow {
    id: String,
    recipient: String,
    cc: Option<String>,
    subject: String,
    document_type: Option<String>,
    document_id: Option<String>,
    attachment_name: Option<String>,
    status: String,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

impl EmailLogRow {
    fn into_log(self) -> Result<EmailLog> {
        Ok(EmailLog {
            id: self.id,
            recipient: self.recipient,
            cc: self
                .cc
                .map(|cc| {
                    cc.split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            subject: self.subject,
            document_type: self
                .document_type
                .as_deref()
                .map(parse_stored::<DocumentType>)
                .transpose()?,
            document_id: self.document_id,
            attachment_name: self.attachment_name,
            status: parse_stored(&self.status)?,
            error_message: self.error_message,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl EmailLogRepository for MySqlEmailLogRepository {
    async fn record(&self, log: &EmailLog) -> Result<()> {
        let cc = (!log.cc.is_empty()).then(|| log.cc.join(","));

        sqlx::query(
            r#"
            INSERT INTO email_logs (
                id, recipient, cc, subject, document_type, document_id,
                attachment_name, status, error_message, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&log.id)
        .bind(&log.recipient)
        .bind(cc)
        .bind(&log.subject)
        .bind(log.document_type.map(|t| t.as_str()))
        .bind(&log.document_id)
        .bind(&log.attachment_name)
        .bind(log.status.as_str())
        .bind(&log.error_message)
        .bind(log.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<EmailLog>> {
        let pattern = query.search_pattern();
        let rows = sqlx::query_as::<_, EmailLogRow>(
            r#"
            SELECT id, recipient, cc, subject, document_type, document_id,
                   attachment_name, status, error_message, created_at
            FROM email_logs
            WHERE (? IS NULL OR status = ?)
              AND (? IS NULL OR recipient LIKE ? OR subject LIKE ?)
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&query.status)
        .bind(&query.status)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EmailLogRow::into_log).collect()
    }
}
