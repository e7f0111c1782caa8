use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{AppError, ListQuery};
use crate::modules::receipt_returns::models::CreateReceiptReturnRequest;
use crate::modules::receipt_returns::services::ReceiptReturnService;

type Service = web::Data<Arc<ReceiptReturnService>>;

/// GET /api/receipt-returns
pub async fn list_returns(
    service: Service,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.list(&query).await?))
}

/// POST /api/receipt-returns
pub async fn create_return(
    service: Service,
    request: web::Json<CreateReceiptReturnRequest>,
) -> Result<HttpResponse, AppError> {
    let receipt_return = service.create(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(receipt_return))
}

pub async fn get_return(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.get(&path).await?))
}

pub async fn delete_return(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/receipt-returns/{id}/complete
pub async fn complete_return(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.complete(&path).await?))
}

pub async fn cancel_return(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.cancel(&path).await?))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/receipt-returns")
            .route("", web::get().to(list_returns))
            .route("", web::post().to(create_return))
            .route("/{id}", web::get().to(get_return))
            .route("/{id}", web::delete().to(delete_return))
            .route("/{id}/complete", web::post().to(complete_return))
            .route("/{id}/cancel", web::post().to(cancel_return)),
    );
}
