use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::validation::{is_valid_email, require_text};
use crate::core::{AppError, FieldError, Result};
use crate::modules::documents::DocumentType;
use crate::string_enum;

string_enum! {
    pub enum EmailStatus {
        Sent => "sent",
        Simulated => "simulated",
        Failed => "failed",
    }
}

/// Document rendered to PDF and attached to the message
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AttachmentRef {
    pub document_type: DocumentType,
    pub document_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SendEmailRequest {
    pub to: String,
    #[serde(default)]
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub attachment: Option<AttachmentRef>,
}

impl SendEmailRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if !is_valid_email(&self.to) {
            errors.push(FieldError::new("to", "to must be a valid email address"));
        }
        for (idx, cc) in self.cc.iter().enumerate() {
            if !is_valid_email(cc) {
                errors.push(FieldError::new(
                    format!("cc[{}]", idx),
                    format!("'{}' is not a valid email address", cc),
                ));
            }
        }
        require_text(&mut errors, "subject", &self.subject, 255);
        require_text(&mut errors, "body", &self.body, 20_000);

        AppError::from_fields(errors)
    }
}

/// One dispatch attempt as stored in `email_logs`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailLog {
    pub id: String,
    pub recipient: String,
    pub cc: Vec<String>,
    pub subject: String,
    pub document_type: Option<DocumentType>,
    pub document_id: Option<String>,
    pub attachment_name: Option<String>,
    pub status: EmailStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl EmailLog {
    pub fn new(request: &SendEmailRequest, attachment_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            recipient: request.to.trim().to_string(),
            cc: request.cc.iter().map(|c| c.trim().to_string()).collect(),
            subject: request.subject.trim().to_string(),
            document_type: request.attachment.as_ref().map(|a| a.document_type),
            document_id: request.attachment.as_ref().map(|a| a.document_id.clone()),
            attachment_name,
            status: EmailStatus::Sent,
            error_message: None,
            created_at: Utc::now(),
        }
    }
}

/// Result returned to the caller of a send
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailDispatch {
    pub log_id: String,
    pub status: EmailStatus,
    pub simulated: bool,
    pub message: String,
}

impl EmailDispatch {
    /// Delivered for real or recorded as a simulation
    pub fn is_accepted(&self) -> bool {
        matches!(self.status, EmailStatus::Sent | EmailStatus::Simulated)
    }
}
