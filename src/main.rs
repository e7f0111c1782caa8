use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tradeflow::config::{Config, SecurityConfig};
use tradeflow::core::error::expose_error_details;
use tradeflow::middleware::{
    json_error_handler, query_error_handler, ErrorHandler, MetricsCollector, MetricsMiddleware,
    RateLimiter, RequestId,
};
use tradeflow::modules::health;
use tradeflow::{AppState, Integrations, Repositories};

fn startup_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(err.to_string())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("tradeflow={},actix_web=info", config.app.log_level))
    });
    let registry = tracing_subscriber::registry().with(filter);

    if config.app.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn cors(security: &SecurityConfig, development: bool) -> Cors {
    match security.cors_allowed_origin.as_deref() {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .expose_headers(vec![header::CONTENT_DISPOSITION])
            .max_age(3600),
        None if development => Cors::permissive(),
        None => Cors::default(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from_env().map_err(startup_error)?;
    init_tracing(&config);
    config.validate().map_err(startup_error)?;
    expose_error_details(config.app.is_development());

    tracing::info!(
        env = %config.app.env,
        bind = %config.server.bind_address(),
        workers = config.server.workers,
        "Starting tradeflow"
    );

    let pool = config.database.create_pool().await.map_err(startup_error)?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(startup_error)?;
    tracing::info!(
        min = config.database.pool_size,
        max = config.database.max_connections,
        "Database pool ready, migrations applied"
    );

    let integrations = Integrations::from_config(&config).map_err(startup_error)?;
    let state = AppState::build(Repositories::mysql(&pool), integrations);
    let metrics = MetricsCollector::new();
    let rate_limiter =
        RateLimiter::new(config.security.rate_limit_per_minute).map_err(startup_error)?;

    let security = config.security.clone();
    let development = config.app.is_development();
    let bind_address = config.server.bind_address();
    let json_limit = config.server.json_limit_bytes;

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(ErrorHandler)
            .wrap(rate_limiter.clone())
            .wrap(MetricsMiddleware::new(metrics.clone()))
            .wrap(TracingLogger::default())
            .wrap(RequestId)
            .wrap(cors(&security, development))
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(metrics.clone()))
            .app_data(
                web::JsonConfig::default()
                    .limit(json_limit)
                    .error_handler(json_error_handler),
            )
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .configure(health::configure)
            .configure(move |cfg| state.configure_api(cfg))
    })
    .workers(config.server.workers)
    .shutdown_timeout(config.server.shutdown_timeout_secs)
    .bind(&bind_address)?
    .run()
    .await
}
