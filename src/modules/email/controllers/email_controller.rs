use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{AppError, ListQuery};
use crate::modules::email::models::SendEmailRequest;
use crate::modules::email::services::EmailService;

type Service = web::Data<Arc<EmailService>>;

/// POST /api/email/send
pub async fn send_email(
    service: Service,
    request: web::Json<SendEmailRequest>,
) -> Result<HttpResponse, AppError> {
    let dispatch = service.send(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(dispatch))
}

/// GET /api/email/logs
pub async fn list_logs(
    service: Service,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.logs(&query).await?))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/email")
            .route("/send", web::post().to(send_email))
            .route("/logs", web::get().to(list_logs)),
    );
}
