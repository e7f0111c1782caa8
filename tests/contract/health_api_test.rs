// Contract tests for the health checks and the metrics snapshot

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::{test, App};
use serde_json::{json, Value};

use helpers::TestApp;
use tradeflow::middleware::{ErrorHandler, Metrics, MetricsMiddleware, RequestId};

#[actix_web::test]
async fn test_health_reports_service_and_version() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "tradeflow");
    assert!(body["version"].is_string());
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn test_request_id_is_echoed() {
    let ctx = TestApp::new();
    let app = test::init_service(
        App::new()
            .wrap(ErrorHandler)
            .wrap(RequestId)
            .configure(|cfg| ctx.configure(cfg)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header(("x-request-id", "trace-42"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "trace-42");
}

#[actix_web::test]
async fn test_metrics_count_requests_by_route() {
    let ctx = TestApp::new();
    let app = test::init_service(
        App::new()
            .wrap(MetricsMiddleware::new(ctx.metrics.clone()))
            .configure(|cfg| ctx.configure(cfg)),
    )
    .await;

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/api/customers/unknown")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }
    let req = test::TestRequest::post()
        .uri("/api/customers")
        .set_json(json!({"name": "Seef Traders"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let metrics: Metrics = test::call_and_read_body_json(&app, req).await;

    assert_eq!(metrics.total_requests, 3);
    assert_eq!(metrics.client_errors, 2);
    assert_eq!(metrics.successful_requests, 1);
    let lookups = &metrics.endpoints["GET /api/customers/{id}"];
    assert_eq!(lookups.requests, 2);
    assert_eq!(lookups.errors, 2);
}
