use std::time::Instant;

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: ReadinessChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessChecks {
    pub database: bool,
    /// Round trip of the database ping, absent when it failed
    pub database_latency_ms: Option<u64>,
}

/// GET /health - liveness, never touches the database
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /ready - 503 until the database answers a ping
pub async fn readiness_check(pool: web::Data<MySqlPool>) -> impl Responder {
    let started = Instant::now();
    let checks = match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => ReadinessChecks {
            database: true,
            database_latency_ms: Some(started.elapsed().as_millis() as u64),
        },
        Err(e) => {
            tracing::error!(error = %e, "Database readiness check failed");
            ReadinessChecks {
                database: false,
                database_latency_ms: None,
            }
        }
    };

    let response = ReadinessResponse {
        ready: checks.database,
        checks,
    };
    if response.ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
