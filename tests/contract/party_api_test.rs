// Contract tests for /api/customers and /api/suppliers

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::{test, App};
use serde_json::{json, Value};

use helpers::{assert_error, TestApp};

#[actix_web::test]
async fn test_create_customer_assigns_code_and_defaults() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/customers")
        .set_json(json!({
            "name": "  Al Noor Contracting ",
            "email": "Procurement@AlNoor.test",
            "phone": "+973 3300 1122"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "CUST-0001");
    assert_eq!(body["name"], "Al Noor Contracting");
    assert_eq!(body["email"], "procurement@alnoor.test");
    assert_eq!(body["payment_terms_days"], 30);
    assert_eq!(body["is_active"], true);
}

#[actix_web::test]
async fn test_duplicate_customer_name_is_conflict() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let first = test::TestRequest::post()
        .uri("/api/customers")
        .set_json(json!({"name": "Delmon Steel"}))
        .to_request();
    assert_eq!(test::call_service(&app, first).await.status(), 201);

    let second = test::TestRequest::post()
        .uri("/api/customers")
        .set_json(json!({"name": "DELMON STEEL"}))
        .to_request();
    let resp = test::call_service(&app, second).await;
    assert_eq!(resp.status(), 409);
    let body: Value = test::read_body_json(resp).await;
    assert_error(&body, 409);
}

#[actix_web::test]
async fn test_customers_and_suppliers_are_separate_registers() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    for uri in ["/api/customers", "/api/suppliers"] {
        let req = test::TestRequest::post()
            .uri(uri)
            .set_json(json!({"name": "Bahrain Cables"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);
    }

    let req = test::TestRequest::get().uri("/api/suppliers").to_request();
    let suppliers: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(suppliers.len(), 1);
    assert_eq!(suppliers[0]["code"], "SUP-0001");
}

#[actix_web::test]
async fn test_invalid_party_fields_are_reported() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/suppliers")
        .set_json(json!({"name": " ", "email": "not-an-email", "payment_terms_days": 400}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    let fields: Vec<&str> = body["error"]["fields"]
        .as_array()
        .expect("field errors")
        .iter()
        .filter_map(|f| f["field"].as_str())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"payment_terms_days"));
}

#[actix_web::test]
async fn test_missing_party_is_not_found() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::get()
        .uri("/api/customers/does-not-exist")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_update_rejects_taking_another_partys_email() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/suppliers")
        .set_json(json!({"name": "Gulf Fasteners", "email": "sales@gulffast.test"}))
        .to_request();
    let _: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/suppliers")
        .set_json(json!({"name": "Island Bolts"}))
        .to_request();
    let second: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/suppliers/{}", second["id"].as_str().unwrap()))
        .set_json(json!({"name": "Island Bolts", "email": "SALES@gulffast.test"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);
}

#[actix_web::test]
async fn test_duplicate_supplier_email_is_conflict() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/suppliers")
        .set_json(json!({"name": "Arad Hardware", "email": "quotes@arad.test"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);

    let req = test::TestRequest::post()
        .uri("/api/suppliers")
        .set_json(json!({"name": "Arad Hardware Trading", "email": " Quotes@Arad.test "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);
    let body: Value = test::read_body_json(resp).await;
    assert_error(&body, 409);

    // The same address is free in the customer register
    let req = test::TestRequest::post()
        .uri("/api/customers")
        .set_json(json!({"name": "Arad Hardware", "email": "quotes@arad.test"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);
}

#[actix_web::test]
async fn test_accented_duplicate_name_is_reported_as_name_clash() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/customers")
        .set_json(json!({"name": "Société Étoile", "email": "achats@etoile.test"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);

    let req = test::TestRequest::post()
        .uri("/api/customers")
        .set_json(json!({"name": "SOCIÉTÉ ÉTOILE"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);
    let body: Value = test::read_body_json(resp).await;
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("name"), "unexpected message: {}", message);
}
