use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{AppError, ListQuery};
use crate::modules::documents::controllers::pdf_response;
use crate::modules::documents::{DocumentCatalog, DocumentType};
use crate::modules::email::EmailService;
use crate::modules::supplier_lpos::models::{
    CreateSupplierLpoRequest, LpoAction, LpoEmailRequest, LpoStatus, LpoStatusRequest,
    UpdateSupplierLpoRequest,
};
use crate::modules::supplier_lpos::services::SupplierLpoService;

type Service = web::Data<Arc<SupplierLpoService>>;

/// Shorthand action bodies are optional
type ActionBody = Option<web::Json<LpoAction>>;

/// GET /api/supplier-lpos
pub async fn list_lpos(
    service: Service,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.list(&query).await?))
}

/// POST /api/supplier-lpos
pub async fn create_lpo(
    service: Service,
    request: web::Json<CreateSupplierLpoRequest>,
) -> Result<HttpResponse, AppError> {
    let lpo = service.create(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(lpo))
}

pub async fn get_lpo(service: Service, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.get(&path).await?))
}

pub async fn update_lpo(
    service: Service,
    path: web::Path<String>,
    request: web::Json<UpdateSupplierLpoRequest>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.update(&path, request.into_inner()).await?))
}

pub async fn delete_lpo(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PATCH /api/supplier-lpos/{id}/status
pub async fn change_status(
    service: Service,
    path: web::Path<String>,
    request: web::Json<LpoStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let LpoStatusRequest { status, action } = request.into_inner();
    Ok(HttpResponse::Ok().json(service.transition(&path, status, action).await?))
}

async fn apply(
    service: Service,
    id: &str,
    next: LpoStatus,
    body: ActionBody,
) -> Result<HttpResponse, AppError> {
    let action = body.map(web::Json::into_inner).unwrap_or_default();
    Ok(HttpResponse::Ok().json(service.transition(id, next, action).await?))
}

/// POST /api/supplier-lpos/{id}/submit
pub async fn submit_lpo(
    service: Service,
    path: web::Path<String>,
    body: ActionBody,
) -> Result<HttpResponse, AppError> {
    apply(service, &path, LpoStatus::Submitted, body).await
}

pub async fn approve_lpo(
    service: Service,
    path: web::Path<String>,
    body: ActionBody,
) -> Result<HttpResponse, AppError> {
    apply(service, &path, LpoStatus::Approved, body).await
}

pub async fn reject_lpo(
    service: Service,
    path: web::Path<String>,
    body: ActionBody,
) -> Result<HttpResponse, AppError> {
    apply(service, &path, LpoStatus::Rejected, body).await
}

pub async fn send_lpo(
    service: Service,
    path: web::Path<String>,
    body: ActionBody,
) -> Result<HttpResponse, AppError> {
    apply(service, &path, LpoStatus::SentToSupplier, body).await
}

pub async fn confirm_lpo(
    service: Service,
    path: web::Path<String>,
    body: ActionBody,
) -> Result<HttpResponse, AppError> {
    apply(service, &path, LpoStatus::Confirmed, body).await
}

pub async fn cancel_lpo(
    service: Service,
    path: web::Path<String>,
    body: ActionBody,
) -> Result<HttpResponse, AppError> {
    apply(service, &path, LpoStatus::Cancelled, body).await
}

/// GET /api/supplier-lpos/{id}/history
pub async fn get_history(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.history(&path).await?))
}

/// GET /api/supplier-lpos/{id}/pdf
pub async fn download_pdf(
    catalog: web::Data<Arc<DocumentCatalog>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let document = catalog.render(DocumentType::SupplierLpo, &path).await?;
    Ok(pdf_response(document))
}

/// POST /api/supplier-lpos/{id}/email
pub async fn email_lpo(
    service: Service,
    email: web::Data<Arc<EmailService>>,
    path: web::Path<String>,
    body: Option<web::Json<LpoEmailRequest>>,
) -> Result<HttpResponse, AppError> {
    let request = body.map(web::Json::into_inner).unwrap_or_default();
    let outcome = service.send_email(&path, request, &email).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/supplier-lpos")
            .route("", web::get().to(list_lpos))
            .route("", web::post().to(create_lpo))
            .route("/{id}", web::get().to(get_lpo))
            .route("/{id}", web::put().to(update_lpo))
            .route("/{id}", web::delete().to(delete_lpo))
            .route("/{id}/status", web::patch().to(change_status))
            .route("/{id}/submit", web::post().to(submit_lpo))
            .route("/{id}/approve", web::post().to(approve_lpo))
            .route("/{id}/reject", web::post().to(reject_lpo))
            .route("/{id}/send", web::post().to(send_lpo))
            .route("/{id}/confirm", web::post().to(confirm_lpo))
            .route("/{id}/cancel", web::post().to(cancel_lpo))
            .route("/{id}/history", web::get().to(get_history))
            .route("/{id}/pdf", web::get().to(download_pdf))
            .route("/{id}/email", web::post().to(email_lpo)),
    );
}
