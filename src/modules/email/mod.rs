pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{EmailDispatch, EmailLog, EmailStatus, SendEmailRequest};
pub use repositories::{EmailLogRepository, MySqlEmailLogRepository};
pub use services::{EmailService, Mailer, SmtpMailer};
