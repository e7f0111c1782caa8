// Contract tests for the supplier LPO approval workflow, PDF download and email dispatch

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::http::header;
use actix_web::{test, App};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use helpers::{assert_error, decimal, line, TestApp};
use tradeflow::modules::email::EmailStatus;

macro_rules! create_supplier {
    ($app:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/suppliers")
            .set_json(json!({"name": "Gulf Pipes & Fittings", "email": $email}))
            .to_request();
        let supplier: Value = test::call_and_read_body_json(&$app, req).await;
        supplier["id"].as_str().expect("supplier id").to_string()
    }};
}

macro_rules! create_lpo {
    ($app:expr, $supplier_id:expr, $items:expr) => {{
        let items: Vec<Value> = $items;
        let req = test::TestRequest::post()
            .uri("/api/supplier-lpos")
            .set_json(json!({
                "supplier_id": $supplier_id,
                "currency": "BHD",
                "created_by": "buyer@gulftrading.test",
                "items": items,
            }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 201);
        let lpo: Value = test::read_body_json(resp).await;
        lpo
    }};
}

/// POST a workflow action such as `submit` or `approve`
macro_rules! step {
    ($app:expr, $id:expr, $action:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri(&format!("/api/supplier-lpos/{}/{}", $id, $action))
            .set_json($body)
            .to_request();
        test::call_service(&$app, req).await
    }};
}

#[actix_web::test]
async fn test_create_lpo_prices_lines_and_starts_as_draft() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let supplier_id = create_supplier!(app, None::<&str>);

    let mut pipe = line("HDPE pipe 110mm", "10", "12.5");
    pipe["tax_percent"] = json!("10");
    let lpo = create_lpo!(app, &supplier_id, vec![pipe, line("Elbow 90deg", "4", "1.125")]);

    assert_eq!(lpo["status"], "draft");
    assert!(lpo["lpo_number"].as_str().unwrap().starts_with("LPO-"));
    assert_eq!(lpo["items"].as_array().unwrap().len(), 2);
    assert_eq!(decimal(&lpo["subtotal"]), dec!(129.500));
    assert_eq!(decimal(&lpo["tax_total"]), dec!(12.500));
    assert_eq!(decimal(&lpo["total_amount"]), dec!(142.000));
}

#[actix_web::test]
async fn test_lpo_for_unknown_supplier_is_rejected() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/supplier-lpos")
        .set_json(json!({"supplier_id": "missing", "items": [line("Valve", "1", "5")]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_approval_workflow_records_history() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let supplier_id = create_supplier!(app, None::<&str>);
    let lpo = create_lpo!(app, &supplier_id, vec![line("Gate valve 2in", "3", "18")]);
    let id = lpo["id"].as_str().unwrap();

    let resp = step!(app, id, "submit", json!({"performed_by": "buyer"}));
    assert_eq!(resp.status(), 200);
    let submitted: Value = test::read_body_json(resp).await;
    assert_eq!(submitted["status"], "submitted");
    assert!(submitted["submitted_at"].is_string());

    let resp = step!(app, id, "approve", json!({"performed_by": "manager"}));
    assert_eq!(resp.status(), 200);
    let approved: Value = test::read_body_json(resp).await;
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["approved_by"], "manager");

    let req = test::TestRequest::get()
        .uri(&format!("/api/supplier-lpos/{}/history", id))
        .to_request();
    let history: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    let steps: Vec<(Value, Value)> = history
        .iter()
        .map(|h| (h["from_status"].clone(), h["to_status"].clone()))
        .collect();
    assert_eq!(
        steps,
        vec![
            (Value::Null, json!("draft")),
            (json!("draft"), json!("submitted")),
            (json!("submitted"), json!("approved")),
        ]
    );
}

#[actix_web::test]
async fn test_rejection_needs_a_reason() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let supplier_id = create_supplier!(app, None::<&str>);
    let lpo = create_lpo!(app, &supplier_id, vec![line("Ball valve", "2", "9")]);
    let id = lpo["id"].as_str().unwrap();

    assert_eq!(step!(app, id, "submit", json!({})).status(), 200);

    let resp = step!(app, id, "reject", json!({"performed_by": "manager"}));
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_error(&body, 400);
    assert_eq!(body["error"]["fields"][0]["field"], "notes");

    let resp = step!(app, id, "reject", json!({"notes": "Price above budget"}));
    assert_eq!(resp.status(), 200);
    let rejected: Value = test::read_body_json(resp).await;
    assert_eq!(rejected["status"], "rejected");
    assert_eq!(rejected["rejection_reason"], "Price above budget");
}

#[actix_web::test]
async fn test_skipping_a_workflow_step_is_unprocessable() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let supplier_id = create_supplier!(app, None::<&str>);
    let lpo = create_lpo!(app, &supplier_id, vec![line("Flange", "6", "3.2")]);
    let id = lpo["id"].as_str().unwrap();

    let resp = step!(app, id, "approve", json!({}));
    assert_eq!(resp.status(), 422);
    let body: Value = test::read_body_json(resp).await;
    assert_error(&body, 422);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/supplier-lpos/{}/status", id))
        .set_json(json!({"status": "confirmed"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 422);
}

#[actix_web::test]
async fn test_empty_lpo_cannot_be_submitted() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let supplier_id = create_supplier!(app, None::<&str>);
    let lpo = create_lpo!(app, &supplier_id, Vec::new());

    let resp = step!(app, lpo["id"].as_str().unwrap(), "submit", json!({}));
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_only_drafts_can_be_deleted() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let supplier_id = create_supplier!(app, None::<&str>);

    let draft = create_lpo!(app, &supplier_id, vec![line("Tee", "1", "2")]);
    let req = test::TestRequest::delete()
        .uri(&format!("/api/supplier-lpos/{}", draft["id"].as_str().unwrap()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);

    let submitted = create_lpo!(app, &supplier_id, vec![line("Tee", "1", "2")]);
    let id = submitted["id"].as_str().unwrap();
    assert_eq!(step!(app, id, "submit", json!({})).status(), 200);
    let req = test::TestRequest::delete()
        .uri(&format!("/api/supplier-lpos/{}", id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 422);
}

#[actix_web::test]
async fn test_pdf_download_is_an_attachment() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let supplier_id = create_supplier!(app, Some("orders@gulfpipes.test"));
    let lpo = create_lpo!(app, &supplier_id, vec![line("Pipe clamp", "50", "0.75")]);
    let number = lpo["lpo_number"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/supplier-lpos/{}/pdf", lpo["id"].as_str().unwrap()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains(number));

    let bytes = test::read_body(resp).await;
    assert!(bytes.starts_with(b"%PDF"));
}

#[actix_web::test]
async fn test_email_requires_an_approved_lpo() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let supplier_id = create_supplier!(app, Some("orders@gulfpipes.test"));
    let lpo = create_lpo!(app, &supplier_id, vec![line("Coupling", "8", "1.5")]);

    let req = test::TestRequest::post()
        .uri(&format!("/api/supplier-lpos/{}/email", lpo["id"].as_str().unwrap()))
        .set_json(json!({}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 422);
    assert!(ctx.email_logs.all().is_empty());
}

#[actix_web::test]
async fn test_emailing_approved_lpo_marks_it_sent() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let supplier_id = create_supplier!(app, Some("orders@gulfpipes.test"));
    let lpo = create_lpo!(app, &supplier_id, vec![line("Coupling", "8", "1.5")]);
    let id = lpo["id"].as_str().unwrap();
    assert_eq!(step!(app, id, "submit", json!({})).status(), 200);
    assert_eq!(step!(app, id, "approve", json!({})).status(), 200);

    let req = test::TestRequest::post()
        .uri(&format!("/api/supplier-lpos/{}/email", id))
        .set_json(json!({"performed_by": "buyer"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let outcome: Value = test::read_body_json(resp).await;
    assert_eq!(outcome["dispatch"]["simulated"], true);
    assert_eq!(outcome["lpo"]["status"], "sent_to_supplier");
    assert!(outcome["lpo"]["sent_at"].is_string());

    let logs = ctx.email_logs.all();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].recipient, "orders@gulfpipes.test");
    assert_eq!(logs[0].status, EmailStatus::Simulated);
    assert_eq!(logs[0].document_id.as_deref(), Some(id));
    assert!(logs[0].attachment_name.as_deref().unwrap().ends_with(".pdf"));
}

#[actix_web::test]
async fn test_editing_rejected_lpo_reprices_and_returns_to_draft() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let supplier_id = create_supplier!(app, None::<&str>);
    let lpo = create_lpo!(app, &supplier_id, vec![line("Check valve", "2", "40")]);
    let id = lpo["id"].as_str().unwrap();
    assert_eq!(step!(app, id, "submit", json!({})).status(), 200);
    assert_eq!(
        step!(app, id, "reject", json!({"notes": "Too expensive"})).status(),
        200
    );

    let mut cheaper = line("Check valve", "2", "32.5");
    cheaper["tax_percent"] = json!("10");
    let req = test::TestRequest::put()
        .uri(&format!("/api/supplier-lpos/{}", id))
        .set_json(json!({"items": [cheaper], "performed_by": "buyer"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let edited: Value = test::read_body_json(resp).await;
    assert_eq!(edited["status"], "draft");
    assert_eq!(decimal(&edited["subtotal"]), dec!(65.000));
    assert_eq!(decimal(&edited["total_amount"]), dec!(71.500));

    let req = test::TestRequest::get()
        .uri(&format!("/api/supplier-lpos/{}/history", id))
        .to_request();
    let history: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    let last = history.last().unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(last["from_status"], "rejected");
    assert_eq!(last["to_status"], "draft");
    assert_eq!(last["performed_by"], "buyer");

    // Back in draft, the workflow can start again
    assert_eq!(step!(app, id, "submit", json!({})).status(), 200);
}
