use serde::Deserialize;
use std::env;

use crate::config::parse_env;
use crate::core::{AppError, Result};

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    /// Largest accepted JSON body; documents with many lines need more than actix's 32 KiB
    pub json_limit_bytes: usize,
    /// Grace period for in-flight requests on shutdown
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            workers: num_cpus::get() * 2,
            json_limit_bytes: 1024 * 1024,
            shutdown_timeout_secs: 30,
        }
    }

    pub fn from_env() -> Result<Self> {
        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let defaults = Self::new(host, parse_env("SERVER_PORT", 8080)?);

        Ok(Self {
            workers: parse_env("SERVER_WORKERS", defaults.workers)?,
            json_limit_bytes: parse_env("SERVER_JSON_LIMIT_BYTES", defaults.json_limit_bytes)?,
            shutdown_timeout_secs: parse_env(
                "SERVER_SHUTDOWN_TIMEOUT_SECS",
                defaults.shutdown_timeout_secs,
            )?,
            ..defaults
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(AppError::Configuration(
                "SERVER_WORKERS must be greater than 0".to_string(),
            ));
        }
        if self.json_limit_bytes < 4096 {
            return Err(AppError::Configuration(
                "SERVER_JSON_LIMIT_BYTES must be at least 4096".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
