use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::AppError;
use crate::modules::assistant::models::{AutofillRequest, ChatRequest};
use crate::modules::assistant::services::AssistantService;

type Service = web::Data<Arc<AssistantService>>;

/// POST /api/ai/chat
pub async fn chat(
    service: Service,
    request: web::Json<ChatRequest>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.chat(request.into_inner()).await?))
}

/// POST /api/ai/autofill
pub async fn autofill(
    service: Service,
    request: web::Json<AutofillRequest>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.autofill(request.into_inner()).await?))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ai")
            .route("/chat", web::post().to(chat))
            .route("/autofill", web::post().to(autofill)),
    );
}
