use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{AppError, ListQuery};
use crate::modules::purchase_invoices::models::{
    CreatePurchaseInvoiceRequest, PurchaseInvoiceStatusRequest,
};
use crate::modules::purchase_invoices::services::PurchaseInvoiceService;

type Service = web::Data<Arc<PurchaseInvoiceService>>;

/// GET /api/purchase-invoices
pub async fn list_invoices(
    service: Service,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.list(&query).await?))
}

/// POST /api/purchase-invoices
pub async fn create_invoice(
    service: Service,
    request: web::Json<CreatePurchaseInvoiceRequest>,
) -> Result<HttpResponse, AppError> {
    let invoice = service.create(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(invoice))
}

pub async fn get_invoice(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.get(&path).await?))
}

pub async fn delete_invoice(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PATCH /api/purchase-invoices/{id}/status
pub async fn change_status(
    service: Service,
    path: web::Path<String>,
    request: web::Json<PurchaseInvoiceStatusRequest>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.change_status(&path, request.status).await?))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/purchase-invoices")
            .route("", web::get().to(list_invoices))
            .route("", web::post().to(create_invoice))
            .route("/{id}", web::get().to(get_invoice))
            .route("/{id}", web::delete().to(delete_invoice))
            .route("/{id}/status", web::patch().to(change_status)),
    );
}
