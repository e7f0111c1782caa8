use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use std::sync::OnceLock;

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

static EXPOSE_DETAILS: OnceLock<bool> = OnceLock::new();

/// Enable debug details in 5xx response bodies (development only).
/// Only the first call has an effect.
pub fn expose_error_details(enabled: bool) {
    let _ = EXPOSE_DETAILS.set(enabled);
}

fn details_exposed() -> bool {
    EXPOSE_DETAILS.get().copied().unwrap_or(false)
}

/// A single failed field in a request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Validation errors for business rules
    #[error("Validation error: {0}")]
    Validation(String),

    /// Request body failed field-level validation
    #[error("Validation failed for {} field(s)", .0.len())]
    FieldValidation(Vec<FieldError>),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate or still-referenced record
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Status change not allowed by the document workflow
    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    /// Stock movement would make quantity on hand negative
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// PDF rendering errors
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Email delivery errors
    #[error("Email error: {0}")]
    Email(String),

    /// AI provider errors
    #[error("AI provider error: {0}")]
    Ai(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        let mut error = serde_json::json!({
            "message": self.to_string(),
            "code": status_code.as_u16(),
        });

        if let AppError::FieldValidation(fields) = self {
            error["fields"] = serde_json::json!(fields);
        }

        if status_code.is_server_error() && details_exposed() {
            error["details"] = serde_json::json!(format!("{:?}", self));
        }

        HttpResponse::build(status_code).json(serde_json::json!({ "error": error }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::FieldValidation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidTransition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InsufficientStock(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Pdf(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Email(_) => StatusCode::BAD_GATEWAY,
            AppError::Ai(_) => StatusCode::BAD_GATEWAY,
            AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RateLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Collapse a list of field errors into a result
    pub fn from_fields(fields: Vec<FieldError>) -> Result<()> {
        if fields.is_empty() {
            Ok(())
        } else {
            Err(AppError::FieldValidation(fields))
        }
    }

    /// Map MySQL constraint violations onto 409 responses.
    ///
    /// `what` names the record for the message, e.g. "Customer 'ACME'".
    pub fn from_write(err: sqlx::Error, what: &str) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return AppError::conflict(format!("{} already exists", what));
            }
            if db_err.is_foreign_key_violation() {
                return AppError::conflict(format!(
                    "{} is referenced by other records",
                    what
                ));
            }
        }
        AppError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InvalidTransition("x".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_field_errors_in_body() {
        let err = AppError::FieldValidation(vec![FieldError::new("name", "Name is required")]);
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = response.into_body().try_into_bytes().unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], 400);
        assert_eq!(body["error"]["fields"][0]["field"], "name");
        assert!(body["error"].get("details").is_none());
    }

    #[test]
    fn test_from_fields_empty_is_ok() {
        assert!(AppError::from_fields(vec![]).is_ok());
        assert!(AppError::from_fields(vec![FieldError::new("a", "b")]).is_err());
    }
}
