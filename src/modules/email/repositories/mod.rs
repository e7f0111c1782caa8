pub mod email_log_repository;

pub use email_log_repository::{EmailLogRepository, MySqlEmailLogRepository};
