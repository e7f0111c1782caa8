use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{AppError, ListQuery};
use crate::modules::stock_issues::models::CreateStockIssueRequest;
use crate::modules::stock_issues::services::StockIssueService;

type Service = web::Data<Arc<StockIssueService>>;

/// GET /api/stock-issues
pub async fn list_issues(
    service: Service,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.list(&query).await?))
}

/// POST /api/stock-issues
pub async fn create_issue(
    service: Service,
    request: web::Json<CreateStockIssueRequest>,
) -> Result<HttpResponse, AppError> {
    let issue = service.create(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(issue))
}

pub async fn get_issue(service: Service, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.get(&path).await?))
}

pub async fn delete_issue(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/stock-issues/{id}/issue
pub async fn issue_stock(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.issue(&path).await?))
}

/// POST /api/stock-issues/{id}/cancel
pub async fn cancel_issue(
    service: Service,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.cancel(&path).await?))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stock-issues")
            .route("", web::get().to(list_issues))
            .route("", web::post().to(create_issue))
            .route("/{id}", web::get().to(get_issue))
            .route("/{id}", web::delete().to(delete_issue))
            .route("/{id}/issue", web::post().to(issue_stock))
            .route("/{id}/cancel", web::post().to(cancel_issue)),
    );
}
