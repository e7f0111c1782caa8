use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{AppError, LineItemInput, ListQuery};
use crate::modules::supplier_quotes::models::{
    CreateSupplierQuoteRequest, SupplierQuoteStatusRequest, UpdateSupplierQuoteRequest,
};
use crate::modules::supplier_quotes::services::SupplierQuoteService;

type Service = web::Data<Arc<SupplierQuoteService>>;

/// GET /api/supplier-quotes?enquiry_id=&supplier_id=&status=
pub async fn list_quotes(
    service: Service,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.list(&query).await?))
}

pub async fn create_quote(
    service: Service,
    request: web::Json<CreateSupplierQuoteRequest>,
) -> Result<HttpResponse, AppError> {
    let quote = service.create(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(quote))
}

pub async fn get_quote(service: Service, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.get(&path).await?))
}

pub async fn update_quote(
    service: Service,
    path: web::Path<String>,
    request: web::Json<UpdateSupplierQuoteRequest>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.update(&path, request.into_inner()).await?))
}

pub async fn delete_quote(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn change_status(
    service: Service,
    path: web::Path<String>,
    request: web::Json<SupplierQuoteStatusRequest>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.change_status(&path, request.status).await?))
}

/// GET /api/enquiries/{id}/supplier-quotes
pub async fn compare_for_enquiry(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.compare_for_enquiry(&path).await?))
}

pub async fn list_items(service: Service, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.list_items(&path).await?))
}

pub async fn add_item(
    service: Service,
    path: web::Path<String>,
    request: web::Json<LineItemInput>,
) -> Result<HttpResponse, AppError> {
    let item = service.add_item(&path, request.into_inner()).await?;
    Ok(HttpResponse::Created().json(item))
}

pub async fn update_item(
    service: Service,
    path: web::Path<(String, String)>,
    request: web::Json<LineItemInput>,
) -> Result<HttpResponse, AppError> {
    let (id, item_id) = path.into_inner();
    Ok(HttpResponse::Ok().json(service.update_item(&id, &item_id, request.into_inner()).await?))
}

pub async fn remove_item(
    service: Service,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (id, item_id) = path.into_inner();
    service.remove_item(&id, &item_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/supplier-quotes")
            .route("", web::get().to(list_quotes))
            .route("", web::post().to(create_quote))
            .route("/{id}", web::get().to(get_quote))
            .route("/{id}", web::put().to(update_quote))
            .route("/{id}", web::delete().to(delete_quote))
            .route("/{id}/status", web::patch().to(change_status))
            .route("/{id}/items", web::get().to(list_items))
            .route("/{id}/items", web::post().to(add_item))
            .route("/{id}/items/{item_id}", web::put().to(update_item))
            .route("/{id}/items/{item_id}", web::delete().to(remove_item)),
    );
}
