// Request counters served at GET /metrics.
// Endpoints are keyed by route pattern so ids never create new series.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::middleware::request_id::RequestIdValue;

/// Endpoint key for requests that matched no route
pub const UNMATCHED_ROUTE: &str = "<unmatched>";

/// Shared request counters; clones point at the same data
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    started_at: Instant,
    data: Arc<Mutex<MetricsData>>,
}

#[derive(Debug, Default)]
pub(crate) struct MetricsData {
    pub(crate) total_requests: u64,
    pub(crate) successful_requests: u64,
    pub(crate) client_errors: u64,
    pub(crate) server_errors: u64,
    pub(crate) total_response_time_ms: u64,
    /// None until the first request
    pub(crate) min_response_time_ms: Option<u64>,
    pub(crate) max_response_time_ms: u64,
    pub(crate) endpoints: BTreeMap<String, EndpointStats>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointStats {
    pub requests: u64,
    pub errors: u64,
    pub total_response_time_ms: u64,
}

/// Snapshot returned by GET /metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metrics {
    pub uptime_secs: u64,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    pub min_response_time_ms: u64,
    pub avg_response_time_ms: u64,
    pub max_response_time_ms: u64,
    /// Percentage of 4xx and 5xx responses
    pub error_rate: f64,
    pub endpoints: BTreeMap<String, EndpointStats>,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            data: Arc::new(Mutex::new(MetricsData::default())),
        }
    }

    fn record_request(&self, endpoint: &str, status_code: u16, response_time_ms: u64) {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());

        data.total_requests += 1;
        data.total_response_time_ms += response_time_ms;
        data.max_response_time_ms = data.max_response_time_ms.max(response_time_ms);
        data.min_response_time_ms = Some(
            data.min_response_time_ms
                .map_or(response_time_ms, |min| min.min(response_time_ms)),
        );

        match status_code {
            200..=399 => data.successful_requests += 1,
            400..=499 => data.client_errors += 1,
            500..=599 => data.server_errors += 1,
            _ => {}
        }

        let stats = data.endpoints.entry(endpoint.to_string()).or_default();
        stats.requests += 1;
        stats.total_response_time_ms += response_time_ms;
        if status_code >= 400 {
            stats.errors += 1;
        }
    }

    pub fn get_metrics(&self) -> Metrics {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());

        let (avg_response_time_ms, error_rate) = if data.total_requests > 0 {
            (
                data.total_response_time_ms / data.total_requests,
                (data.client_errors + data.server_errors) as f64 / data.total_requests as f64
                    * 100.0,
            )
        } else {
            (0, 0.0)
        };

        Metrics {
            uptime_secs: self.started_at.elapsed().as_secs(),
            total_requests: data.total_requests,
            successful_requests: data.successful_requests,
            client_errors: data.client_errors,
            server_errors: data.server_errors,
            min_response_time_ms: data.min_response_time_ms.unwrap_or(0),
            avg_response_time_ms,
            max_response_time_ms: data.max_response_time_ms,
            error_rate,
            endpoints: data.endpoints.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn set_test_data<F>(&self, f: F)
    where
        F: FnOnce(&mut MetricsData),
    {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut data);
    }
}

/// Records every response into a [`MetricsCollector`]
pub struct MetricsMiddleware {
    collector: MetricsCollector,
}

impl MetricsMiddleware {
    pub fn new(collector: MetricsCollector) -> Self {
        Self { collector }
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MetricsMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service: Rc::new(service),
            collector: self.collector.clone(),
        }))
    }
}

pub struct MetricsMiddlewareService<S> {
    service: Rc<S>,
    collector: MetricsCollector,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
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
        let svc = self.service.clone();
        let collector = self.collector.clone();
        // Raw paths of unrouted requests would grow the table without bound
        let endpoint = match req.match_pattern() {
            Some(pattern) => format!("{} {}", req.method(), pattern),
            None => format!("{} {}", req.method(), UNMATCHED_ROUTE),
        };
        let started = Instant::now();

        Box::pin(async move {
            let request_id = req
                .extensions()
                .get::<RequestIdValue>()
                .map(|id| id.0.clone())
                .unwrap_or_else(|| "unknown".to_string());

            let response = svc.call(req).await?;

            let response_time_ms = started.elapsed().as_millis() as u64;
            let status_code = response.status().as_u16();
            collector.record_request(&endpoint, status_code, response_time_ms);

            tracing::info!(
                request_id = %request_id,
                endpoint = %endpoint,
                status = status_code,
                response_time_ms = response_time_ms,
                "Request completed"
            );

            Ok(response)
        })
    }
}
