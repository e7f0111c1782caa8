pub mod error_handler;
pub mod metrics;
pub mod rate_limit;
pub mod request_id;

pub use error_handler::{json_error_handler, query_error_handler, ErrorHandler};
pub use metrics::{EndpointStats, Metrics, MetricsCollector, MetricsMiddleware};
pub use rate_limit::RateLimiter;
pub use request_id::{RequestId, RequestIdValue};
