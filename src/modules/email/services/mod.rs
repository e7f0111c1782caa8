pub mod email_service;
pub mod mailer;

pub use email_service::EmailService;
pub use mailer::{Mailer, OutgoingEmail, PdfAttachment, SmtpMailer};
