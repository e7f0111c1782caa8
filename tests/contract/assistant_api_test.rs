// Contract tests for /api/ai: provider answers, rule-based fallback and autofill

#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;

use actix_web::{test, App};
use async_trait::async_trait;
use serde_json::{json, Value};

use helpers::{assert_error, TestApp};
use tradeflow::core::{AppError, Result};
use tradeflow::modules::assistant::models::ChatMessage;
use tradeflow::modules::assistant::ChatProvider;

struct CannedProvider(&'static str);

#[async_trait]
impl ChatProvider for CannedProvider {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
        Ok(self.0.to_string())
    }

    fn name(&self) -> &str {
        "canned"
    }
}

struct UnreachableProvider;

#[async_trait]
impl ChatProvider for UnreachableProvider {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
        Err(AppError::Ai("provider timed out".to_string()))
    }

    fn name(&self) -> &str {
        "unreachable"
    }
}

#[actix_web::test]
async fn test_chat_without_provider_answers_from_rules() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/ai/chat")
        .set_json(json!({"message": "How do I get an LPO approved?"}))
        .to_request();
    let reply: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(reply["source"], "rules");
    assert!(reply["reply"].as_str().unwrap().contains("Supplier LPOs"));
}

#[actix_web::test]
async fn test_chat_uses_provider_reply() {
    let ctx = TestApp::with_chat(Some(Arc::new(CannedProvider("Open the LPO and submit it."))));
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/ai/chat")
        .set_json(json!({
            "message": "How do I submit?",
            "history": [{"role": "user", "content": "hi"}, {"role": "assistant", "content": "Hello"}]
        }))
        .to_request();
    let reply: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(reply["source"], "openai");
    assert_eq!(reply["reply"], "Open the LPO and submit it.");
}

#[actix_web::test]
async fn test_provider_failure_falls_back_to_rules() {
    let ctx = TestApp::with_chat(Some(Arc::new(UnreachableProvider)));
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/ai/chat")
        .set_json(json!({"message": "where is my stock?"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let reply: Value = test::read_body_json(resp).await;
    assert_eq!(reply["source"], "rules");
}

#[actix_web::test]
async fn test_blank_chat_message_is_rejected() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/ai/chat")
        .set_json(json!({"message": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_error(&body, 400);
}

#[actix_web::test]
async fn test_autofill_normalizes_supplier_fields() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/ai/autofill")
        .set_json(json!({
            "entity": "supplier",
            "fields": {
                "name": "  gulf   cables  co ",
                "email": "Sales@GulfCables.TEST",
                "phone": "00973 1711-2233"
            }
        }))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["source"], "rules");
    let suggestions = &resp["suggestions"];
    assert_eq!(suggestions["name"], "Gulf Cables Co");
    assert_eq!(suggestions["email"], "sales@gulfcables.test");
    assert_eq!(suggestions["phone"], "+97317112233");
    assert_eq!(suggestions["payment_terms_days"], 30);
}

#[actix_web::test]
async fn test_autofill_merges_provider_suggestions() {
    let ctx = TestApp::with_chat(Some(Arc::new(CannedProvider(
        "```json\n{\"unit\": \"roll\", \"notes\": \"Fire rated\"}\n```",
    ))));
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/ai/autofill")
        .set_json(json!({
            "entity": "enquiry_item",
            "fields": {"description": "Cable  2.5mm  100m"}
        }))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["source"], "openai");
    assert_eq!(resp["suggestions"]["unit"], "roll");
    assert_eq!(resp["suggestions"]["notes"], "Fire rated");
    assert_eq!(resp["suggestions"]["description"], "Cable 2.5mm 100m");
    assert_eq!(resp["suggestions"]["quantity"], "1");
}

#[actix_web::test]
async fn test_autofill_rejects_unknown_entity() {
    let ctx = TestApp::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/ai/autofill")
        .set_json(json!({"entity": "payroll", "fields": {}}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
