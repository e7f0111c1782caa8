use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{AppError, ListQuery};
use crate::modules::parties::models::PartyRequest;
use crate::modules::parties::services::PartyService;

/// GET /api/customers, GET /api/suppliers
pub async fn list_parties(
    service: web::Data<Arc<PartyService>>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let parties = service.list(&query).await?;
    Ok(HttpResponse::Ok().json(parties))
}

pub async fn create_party(
    service: web::Data<Arc<PartyService>>,
    request: web::Json<PartyRequest>,
) -> Result<HttpResponse, AppError> {
    let party = service.create(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(party))
}

pub async fn get_party(
    service: web::Data<Arc<PartyService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let party = service.get(&path).await?;
    Ok(HttpResponse::Ok().json(party))
}

pub async fn update_party(
    service: web::Data<Arc<PartyService>>,
    path: web::Path<String>,
    request: web::Json<PartyRequest>,
) -> Result<HttpResponse, AppError> {
    let party = service.update(&path, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(party))
}

pub async fn delete_party(
    service: web::Data<Arc<PartyService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

fn party_scope(path: &str, service: Arc<PartyService>) -> actix_web::Scope {
    web::scope(path)
        .app_data(web::Data::new(service))
        .route("", web::get().to(list_parties))
        .route("", web::post().to(create_party))
        .route("/{id}", web::get().to(get_party))
        .route("/{id}", web::put().to(update_party))
        .route("/{id}", web::delete().to(delete_party))
}

/// Mount `/customers` and `/suppliers`, each scope carrying its own service
pub fn configure(
    customers: Arc<PartyService>,
    suppliers: Arc<PartyService>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(party_scope("/customers", customers))
            .service(party_scope("/suppliers", suppliers));
    }
}
