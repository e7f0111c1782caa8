use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{AppError, ListQuery};
use crate::modules::material_receipts::models::CreateMaterialReceiptRequest;
use crate::modules::material_receipts::services::MaterialReceiptService;

type Service = web::Data<Arc<MaterialReceiptService>>;

/// GET /api/material-receipts
pub async fn list_receipts(
    service: Service,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.list(&query).await?))
}

/// POST /api/material-receipts
pub async fn create_receipt(
    service: Service,
    request: web::Json<CreateMaterialReceiptRequest>,
) -> Result<HttpResponse, AppError> {
    let receipt = service.create(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(receipt))
}

pub async fn get_receipt(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.get(&path).await?))
}

pub async fn delete_receipt(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/material-receipts/{id}/complete
pub async fn complete_receipt(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.complete(&path).await?))
}

/// POST /api/material-receipts/{id}/cancel
pub async fn cancel_receipt(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.cancel(&path).await?))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/material-receipts")
            .route("", web::get().to(list_receipts))
            .route("", web::post().to(create_receipt))
            .route("/{id}", web::get().to(get_receipt))
            .route("/{id}", web::delete().to(delete_receipt))
            .route("/{id}/complete", web::post().to(complete_receipt))
            .route("/{id}/cancel", web::post().to(cancel_receipt)),
    );
}
