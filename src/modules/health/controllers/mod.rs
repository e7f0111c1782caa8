pub mod health_controller;
pub mod metrics;

use actix_web::web;

/// Probes live outside `/api`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_controller::health_check))
        .route("/ready", web::get().to(health_controller::readiness_check))
        .route("/metrics", web::get().to(metrics::get_metrics));
}
