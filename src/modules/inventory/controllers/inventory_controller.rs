use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{AppError, ListQuery};
use crate::modules::inventory::models::InventoryItemRequest;
use crate::modules::inventory::services::InventoryService;

/// GET /api/inventory-items
pub async fn list_items(
    service: web::Data<Arc<InventoryService>>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.list(&query).await?))
}

/// POST /api/inventory-items
pub async fn create_item(
    service: web::Data<Arc<InventoryService>>,
    request: web::Json<InventoryItemRequest>,
) -> Result<HttpResponse, AppError> {
    let item = service.create(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(item))
}

pub async fn get_item(
    service: web::Data<Arc<InventoryService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.get(&path).await?))
}

pub async fn update_item(
    service: web::Data<Arc<InventoryService>>,
    path: web::Path<String>,
    request: web::Json<InventoryItemRequest>,
) -> Result<HttpResponse, AppError> {
    let item = service.update(&path, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

pub async fn delete_item(
    service: web::Data<Arc<InventoryService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/inventory-items/{id}/movements
pub async fn list_movements(
    service: web::Data<Arc<InventoryService>>,
    path: web::Path<String>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.movements(&path, &query).await?))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/inventory-items")
            .route("", web::get().to(list_items))
            .route("", web::post().to(create_item))
            .route("/{id}", web::get().to(get_item))
            .route("/{id}", web::put().to(update_item))
            .route("/{id}", web::delete().to(delete_item))
            .route("/{id}/movements", web::get().to(list_movements)),
    );
}
