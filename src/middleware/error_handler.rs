use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::{JsonPayloadError, QueryPayloadError},
    Error, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::core::AppError;
use crate::middleware::request_id::RequestIdValue;

/// Middleware that logs failed requests with their request id
pub struct ErrorHandler;

impl<S, B> Transform<S, ServiceRequest> for ErrorHandler
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorHandlerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorHandlerMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct ErrorHandlerMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ErrorHandlerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let request_id = req
                .extensions()
                .get::<RequestIdValue>()
                .map(|id| id.0.clone())
                .unwrap_or_else(|| "unknown".to_string());
            let path = req.path().to_string();

            let result = service.call(req).await;

            match &result {
                Err(err) => {
                    tracing::error!(request_id = %request_id, path = %path, error = %err, "Request error");
                }
                Ok(res) if res.status().is_server_error() => {
                    let detail = res
                        .response()
                        .error()
                        .map(|e| e.to_string())
                        .unwrap_or_default();
                    tracing::error!(
                        request_id = %request_id,
                        path = %path,
                        status = res.status().as_u16(),
                        error = %detail,
                        "Request failed"
                    );
                }
                Ok(res) if res.status().is_client_error() => {
                    tracing::debug!(
                        request_id = %request_id,
                        path = %path,
                        status = res.status().as_u16(),
                        "Request rejected"
                    );
                }
                Ok(_) => {}
            }

            result
        })
    }
}

/// Turn JSON body extraction failures into the standard 400 error body
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    let message = match &err {
        JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
        JsonPayloadError::Deserialize(e) => format!("Invalid request body: {}", e),
        other => format!("Invalid request body: {}", other),
    };
    AppError::Validation(message).into()
}

/// Turn query string extraction failures into the standard 400 error body
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> Error {
    AppError::Validation(format!("Invalid query parameters: {}", err)).into()
}
