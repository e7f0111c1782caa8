use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{AppError, ListQuery};
use crate::modules::enquiries::models::{
    CreateEnquiryRequest, EnquiryItemInput, EnquiryStatusRequest, UpdateEnquiryRequest,
};
use crate::modules::enquiries::services::EnquiryService;
use crate::modules::supplier_quotes::controllers::supplier_quote_controller::compare_for_enquiry;

type Service = web::Data<Arc<EnquiryService>>;

/// GET /api/enquiries
pub async fn list_enquiries(
    service: Service,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.list(&query).await?))
}

/// POST /api/enquiries
pub async fn create_enquiry(
    service: Service,
    request: web::Json<CreateEnquiryRequest>,
) -> Result<HttpResponse, AppError> {
    let enquiry = service.create(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(enquiry))
}

pub async fn get_enquiry(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.get(&path).await?))
}

pub async fn update_enquiry(
    service: Service,
    path: web::Path<String>,
    request: web::Json<UpdateEnquiryRequest>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.update(&path, request.into_inner()).await?))
}

pub async fn delete_enquiry(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PATCH /api/enquiries/{id}/status
pub async fn change_status(
    service: Service,
    path: web::Path<String>,
    request: web::Json<EnquiryStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let enquiry = service.change_status(&path, request.status).await?;
    Ok(HttpResponse::Ok().json(enquiry))
}

pub async fn list_items(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.list_items(&path).await?))
}

pub async fn add_item(
    service: Service,
    path: web::Path<String>,
    request: web::Json<EnquiryItemInput>,
) -> Result<HttpResponse, AppError> {
    let item = service.add_item(&path, request.into_inner()).await?;
    Ok(HttpResponse::Created().json(item))
}

pub async fn update_item(
    service: Service,
    path: web::Path<(String, String)>,
    request: web::Json<EnquiryItemInput>,
) -> Result<HttpResponse, AppError> {
    let (id, item_id) = path.into_inner();
    let item = service.update_item(&id, &item_id, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
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
        web::scope("/enquiries")
            .route("", web::get().to(list_enquiries))
            .route("", web::post().to(create_enquiry))
            .route("/{id}", web::get().to(get_enquiry))
            .route("/{id}", web::put().to(update_enquiry))
            .route("/{id}", web::delete().to(delete_enquiry))
            .route("/{id}/status", web::patch().to(change_status))
            .route("/{id}/items", web::get().to(list_items))
            .route("/{id}/items", web::post().to(add_item))
            .route("/{id}/items/{item_id}", web::put().to(update_item))
            .route("/{id}/items/{item_id}", web::delete().to(remove_item))
            .route("/{id}/supplier-quotes", web::get().to(compare_for_enquiry)),
    );
}
