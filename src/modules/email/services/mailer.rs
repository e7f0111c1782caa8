use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::core::{AppError, Result};

/// A message ready for delivery
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachment: Option<PdfAttachment>,
}

#[derive(Debug, Clone)]
pub struct PdfAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Outbound mail transport
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;

    fn name(&self) -> &str;
}

/// SMTP delivery through lettre's tokio transport
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let host = config
            .host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| AppError::Configuration("SMTP_HOST not set".to_string()))?;

        let mut builder = match config.port {
            465 => AsyncSmtpTransport::<Tokio1Executor>::relay(host),
            // Local relays and mail catchers without TLS
            25 | 1025 => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)),
            _ => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host),
        }
        .map_err(|e| AppError::Configuration(format!("Invalid SMTP host '{}': {}", host, e)))?
        .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| AppError::Configuration(format!("Invalid SMTP_FROM: {}", e)))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message> {
        let to: Mailbox = email
            .to
            .trim()
            .parse()
            .map_err(|e| AppError::validation(format!("Invalid recipient '{}': {}", email.to, e)))?;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone());
        for cc in &email.cc {
            let mailbox: Mailbox = cc
                .trim()
                .parse()
                .map_err(|e| AppError::validation(format!("Invalid cc '{}': {}", cc, e)))?;
            builder = builder.cc(mailbox);
        }

        let text = SinglePart::plain(email.body.clone());
        let message = match &email.attachment {
            Some(pdf) => {
                let content_type = ContentType::parse("application/pdf")
                    .map_err(|e| AppError::Email(format!("Invalid content type: {}", e)))?;
                let attachment =
                    Attachment::new(pdf.file_name.clone()).body(pdf.bytes.clone(), content_type);
                builder.multipart(MultiPart::mixed().singlepart(text).singlepart(attachment))
            }
            None => builder.singlepart(text),
        };

        message.map_err(|e| AppError::Email(format!("Failed to build message: {}", e)))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let message = self.build_message(email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Email(format!("SMTP delivery to {} failed: {}", email.to, e)))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "smtp"
    }
}
