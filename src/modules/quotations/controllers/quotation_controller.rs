use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{AppError, LineItemInput, ListQuery};
use crate::modules::documents::controllers::pdf_response;
use crate::modules::documents::{DocumentCatalog, DocumentType};
use crate::modules::quotations::models::{
    CreateQuotationRequest, QuotationStatusRequest, UpdateQuotationRequest,
};
use crate::modules::quotations::services::QuotationService;

type Service = web::Data<Arc<QuotationService>>;

/// GET /api/quotations
pub async fn list_quotations(
    service: Service,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.list(&query).await?))
}

/// POST /api/quotations
pub async fn create_quotation(
    service: Service,
    request: web::Json<CreateQuotationRequest>,
) -> Result<HttpResponse, AppError> {
    let quotation = service.create(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(quotation))
}

pub async fn get_quotation(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.get(&path).await?))
}

pub async fn update_quotation(
    service: Service,
    path: web::Path<String>,
    request: web::Json<UpdateQuotationRequest>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.update(&path, request.into_inner()).await?))
}

pub async fn delete_quotation(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PATCH /api/quotations/{id}/status
pub async fn change_status(
    service: Service,
    path: web::Path<String>,
    request: web::Json<QuotationStatusRequest>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.change_status(&path, request.status).await?))
}

/// POST /api/quotations/{id}/convert-to-order
pub async fn convert_to_order(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order = service.convert_to_order(&path).await?;
    Ok(HttpResponse::Created().json(order))
}

/// GET /api/quotations/{id}/pdf
pub async fn download_pdf(
    catalog: web::Data<Arc<DocumentCatalog>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let document = catalog.render(DocumentType::Quotation, &path).await?;
    Ok(pdf_response(document))
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
        web::scope("/quotations")
            .route("", web::get().to(list_quotations))
            .route("", web::post().to(create_quotation))
            .route("/{id}", web::get().to(get_quotation))
            .route("/{id}", web::put().to(update_quotation))
            .route("/{id}", web::delete().to(delete_quotation))
            .route("/{id}/status", web::patch().to(change_status))
            .route("/{id}/convert-to-order", web::post().to(convert_to_order))
            .route("/{id}/pdf", web::get().to(download_pdf))
            .route("/{id}/items", web::get().to(list_items))
            .route("/{id}/items", web::post().to(add_item))
            .route("/{id}/items/{item_id}", web::put().to(update_item))
            .route("/{id}/items/{item_id}", web::delete().to(remove_item)),
    );
}
