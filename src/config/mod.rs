use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub smtp: SmtpConfig,
    pub ai: AiConfig,
    pub company: CompanyConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        self.env.eq_ignore_ascii_case("development")
    }

    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// SMTP settings; an unset host means email dispatch is simulated
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    /// Record failed deliveries as simulated instead of returning an error
    pub fallback_on_error: bool,
}

impl SmtpConfig {
    pub fn is_configured(&self) -> bool {
        self.host.as_deref().is_some_and(|h| !h.trim().is_empty())
    }
}

/// OpenAI-compatible completion provider; an unset key means rule-based answers only
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl AiConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Letterhead printed on generated documents
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyConfig {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub tax_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub rate_limit_per_minute: u32,
    pub cors_allowed_origin: Option<String>,
}

/// Read an optional variable, treating blank values as unset
pub(crate) fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Read and parse a variable, falling back to `default` when unset
pub(crate) fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T> {
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("Invalid {}", key))),
        None => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "debug".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            smtp: SmtpConfig {
                host: optional_env("SMTP_HOST"),
                port: parse_env("SMTP_PORT", 587)?,
                username: optional_env("SMTP_USERNAME"),
                password: optional_env("SMTP_PASSWORD"),
                from: env::var("SMTP_FROM")
                    .unwrap_or_else(|_| "ERP <no-reply@localhost>".to_string()),
                fallback_on_error: parse_env("SMTP_FALLBACK_ON_ERROR", true)?,
            },
            ai: AiConfig {
                api_key: optional_env("OPENAI_API_KEY"),
                base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                timeout_secs: parse_env("OPENAI_TIMEOUT_SECS", 30)?,
                max_retries: parse_env("OPENAI_MAX_RETRIES", 2)?,
            },
            company: CompanyConfig {
                name: env::var("COMPANY_NAME").unwrap_or_else(|_| "Trading Company".to_string()),
                address: env::var("COMPANY_ADDRESS").unwrap_or_default(),
                phone: env::var("COMPANY_PHONE").unwrap_or_default(),
                email: env::var("COMPANY_EMAIL").unwrap_or_default(),
                tax_number: optional_env("COMPANY_TAX_NUMBER"),
            },
            security: SecurityConfig {
                rate_limit_per_minute: parse_env("RATE_LIMIT_PER_MINUTE", 1000)?,
                cors_allowed_origin: optional_env("CORS_ALLOWED_ORIGIN"),
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.database.validate()?;
        self.server.validate()?;

        if self.security.rate_limit_per_minute == 0 {
            return Err(AppError::Configuration(
                "Rate limit must be greater than 0".to_string(),
            ));
        }

        if !self.smtp.is_configured()
            && (self.smtp.username.is_some() || self.smtp.password.is_some())
        {
            return Err(AppError::Configuration(
                "SMTP credentials are set but SMTP_HOST is missing".to_string(),
            ));
        }

        if self.ai.is_configured() && self.ai.timeout_secs == 0 {
            return Err(AppError::Configuration(
                "OPENAI_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
