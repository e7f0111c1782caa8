use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{AppError, ListQuery};
use crate::modules::documents::controllers::pdf_response;
use crate::modules::documents::{DocumentCatalog, DocumentType};
use crate::modules::sales_orders::models::{CreateSalesOrderRequest, SalesOrderStatusRequest};
use crate::modules::sales_orders::services::SalesOrderService;

type Service = web::Data<Arc<SalesOrderService>>;

/// GET /api/sales-orders
pub async fn list_orders(
    service: Service,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.list(&query).await?))
}

/// POST /api/sales-orders
pub async fn create_order(
    service: Service,
    request: web::Json<CreateSalesOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order = service.create(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

pub async fn get_order(service: Service, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.get(&path).await?))
}

pub async fn delete_order(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PATCH /api/sales-orders/{id}/status
pub async fn change_status(
    service: Service,
    path: web::Path<String>,
    request: web::Json<SalesOrderStatusRequest>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.change_status(&path, request.status).await?))
}

/// GET /api/sales-orders/{id}/pdf
pub async fn download_pdf(
    catalog: web::Data<Arc<DocumentCatalog>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let document = catalog.render(DocumentType::SalesOrder, &path).await?;
    Ok(pdf_response(document))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/sales-orders")
            .route("", web::get().to(list_orders))
            .route("", web::post().to(create_order))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}", web::delete().to(delete_order))
            .route("/{id}/status", web::patch().to(change_status))
            .route("/{id}/pdf", web::get().to(download_pdf)),
    );
}
