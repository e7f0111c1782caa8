use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, HeaderName, HeaderValue},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::time::Instant;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlation id of the current request, readable from request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdValue(pub String);

impl RequestIdValue {
    /// Reuse the caller's id when it is printable ASCII of sane length, else mint one
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let supplied = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| {
                !id.is_empty()
                    && id.len() <= MAX_REQUEST_ID_LEN
                    && id.bytes().all(|b| b.is_ascii_graphic())
            });

        match supplied {
            Some(id) => Self(id.to_string()),
            None => Self(Uuid::new_v4().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Tags every request with an `x-request-id` and echoes it on the response
pub struct RequestId;

impl<S, B> Transform<S, ServiceRequest> for RequestId
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestIdService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdService { inner: service }))
    }
}

pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<ServiceRequest> for RequestIdService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(inner);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let id = RequestIdValue::from_headers(req.headers());
        req.extensions_mut().insert(id.clone());

        let started = Instant::now();
        let route = format!("{} {}", req.method(), req.path());
        let pending = self.inner.call(req);

        Box::pin(async move {
            let mut res = pending.await?;

            tracing::debug!(
                request_id = %id.as_str(),
                route = %route,
                status = res.status().as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Request handled"
            );

            // Minted and filtered ids are always valid header values
            if let Ok(value) = HeaderValue::from_str(id.as_str()) {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderValue;
    use actix_web::{test, web, App, HttpRequest, HttpResponse};

    fn headers_with(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderValue::from_str(id).unwrap(),
        );
        headers
    }

    #[::std::prelude::v1::test]
    fn test_supplied_id_is_trimmed_and_kept() {
        let id = RequestIdValue::from_headers(&headers_with("  lpo-sync-7 "));
        assert_eq!(id.as_str(), "lpo-sync-7");
    }

    #[::std::prelude::v1::test]
    fn test_unusable_ids_are_replaced() {
        let too_long = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        for raw in ["", "has space", too_long.as_str()] {
            let id = RequestIdValue::from_headers(&headers_with(raw));
            assert!(Uuid::parse_str(id.as_str()).is_ok(), "{:?} was kept", raw);
        }
    }

    #[actix_web::test]
    async fn test_handlers_see_the_echoed_id() {
        let app = test::init_service(App::new().wrap(RequestId).route(
            "/whoami",
            web::get().to(|req: HttpRequest| async move {
                let id = req
                    .extensions()
                    .get::<RequestIdValue>()
                    .map(|v| v.0.clone())
                    .unwrap_or_default();
                HttpResponse::Ok().body(id)
            }),
        ))
        .await;

        let req = test::TestRequest::get().uri("/whoami").to_request();
        let resp = test::call_service(&app, req).await;
        let header = resp
            .headers()
            .get(REQUEST_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let body = test::read_body(resp).await;
        assert_eq!(body, header.as_bytes());
    }
}
