use std::sync::Arc;

use crate::core::{AppError, ListQuery, Result};
use crate::modules::documents::DocumentCatalog;
use crate::modules::email::models::{EmailDispatch, EmailLog, EmailStatus, SendEmailRequest};
use crate::modules::email::repositories::EmailLogRepository;
use crate::modules::email::services::mailer::{Mailer, OutgoingEmail, PdfAttachment};

/// Sends mail through the configured transport, or records a simulated dispatch
pub struct EmailService {
    mailer: Option<Arc<dyn Mailer>>,
    logs: Arc<dyn EmailLogRepository>,
    catalog: Arc<DocumentCatalog>,
    fallback_on_error: bool,
}

impl EmailService {
    pub fn new(
        mailer: Option<Arc<dyn Mailer>>,
        logs: Arc<dyn EmailLogRepository>,
        catalog: Arc<DocumentCatalog>,
        fallback_on_error: bool,
    ) -> Self {
        Self {
            mailer,
            logs,
            catalog,
            fallback_on_error,
        }
    }

    pub async fn send(&self, request: SendEmailRequest) -> Result<EmailDispatch> {
        request.validate()?;

        let attachment = match &request.attachment {
            Some(reference) => {
                let rendered = self
                    .catalog
                    .render(reference.document_type, &reference.document_id)
                    .await?;
                Some(PdfAttachment {
                    file_name: rendered.file_name,
                    bytes: rendered.bytes,
                })
            }
            None => None,
        };

        let mut log = EmailLog::new(&request, attachment.as_ref().map(|a| a.file_name.clone()));
        let email = OutgoingEmail {
            to: log.recipient.clone(),
            cc: log.cc.clone(),
            subject: log.subject.clone(),
            body: request.body,
            attachment,
        };

        let message = match &self.mailer {
            None => {
                log.status = EmailStatus::Simulated;
                "SMTP is not configured; email recorded as simulated".to_string()
            }
            Some(mailer) => match mailer.send(&email).await {
                Ok(()) => {
                    log.status = EmailStatus::Sent;
                    format!("Email sent to {}", log.recipient)
                }
                // A message the transport refuses to build is the caller's mistake
                Err(err @ (AppError::Validation(_) | AppError::FieldValidation(_))) => {
                    return Err(err);
                }
                Err(err) if self.fallback_on_error => {
                    tracing::warn!(
                        recipient = %log.recipient,
                        transport = mailer.name(),
                        error = %err,
                        "Email delivery failed, recording simulated dispatch"
                    );
                    log.status = EmailStatus::Simulated;
                    log.error_message = Some(err.to_string());
                    "Delivery failed; email recorded as simulated".to_string()
                }
                Err(err) => {
                    log.status = EmailStatus::Failed;
                    log.error_message = Some(err.to_string());
                    self.logs.record(&log).await?;
                    return Err(err);
                }
            },
        };

        self.logs.record(&log).await?;
        tracing::info!(
            log_id = %log.id,
            recipient = %log.recipient,
            status = %log.status,
            attachment = ?log.attachment_name,
            "Email dispatched"
        );

        Ok(EmailDispatch {
            log_id: log.id,
            status: log.status,
            simulated: log.status == EmailStatus::Simulated,
            message,
        })
    }

    pub async fn logs(&self, query: &ListQuery) -> Result<Vec<EmailLog>> {
        self.logs.list(query).await
    }
}
