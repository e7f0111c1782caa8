use actix_web::{web, HttpResponse};

use crate::middleware::MetricsCollector;

/// GET /metrics - request counters since startup
#[tracing::instrument(skip(collector))]
pub async fn get_metrics(collector: web::Data<MetricsCollector>) -> HttpResponse {
    HttpResponse::Ok().json(collector.get_metrics())
}
