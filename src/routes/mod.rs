pub mod cache;
pub mod charts;
pub mod daily;
pub mod dashboard;
pub mod greenhouses;
pub mod health;
mod rate_limit;
pub mod readings;
pub mod report;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use rate_limit::FallbackIpKeyExtractor;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        greenhouses::list_greenhouses,
        greenhouses::create_greenhouse,
        greenhouses::get_greenhouse,
        greenhouses::rename_greenhouse,
        greenhouses::delete_greenhouse,
        readings::list_greenhouse_readings,
        readings::create_reading,
        readings::list_readings,
        readings::delete_reading,
        daily::get_daily,
        charts::get_climogram,
        charts::get_co2_chart,
        report::get_report,
    ),
    components(
        schemas(
            greenhouses::GreenhouseRequest,
            greenhouses::GreenhouseResponse,
            readings::ReadingResponse,
            crate::store::NewReading,
            daily::DailyResponse,
            crate::analytics::DailySummary,
            crate::analytics::PeriodSummary,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "greenhouses", description = "Greenhouse management"),
        (name = "readings", description = "Recorded readings"),
        (name = "aggregates", description = "Daily aggregates computed on read"),
        (name = "charts", description = "Rendered charts"),
        (name = "reports", description = "PDF export"),
    ),
    info(
        title = "Greenhouse Monitor API",
        description = "Environmental monitoring for greenhouses",
        version = "0.1.0"
    )
)]
struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
    } else {
        tracing::info!(
            read_rate = %format!("{}/s burst {}", config.rate_limit_read_per_second, config.rate_limit_read_burst),
            write_rate = %format!("{}/s burst {}", config.rate_limit_write_per_second, config.rate_limit_write_burst),
            "Rate limiting configured"
        );
    }

    // Base routes without rate limiting
    let read_routes_base = Router::new()
        .route("/greenhouses", get(greenhouses::list_greenhouses))
        .route("/greenhouses/{greenhouse}", get(greenhouses::get_greenhouse))
        .route(
            "/greenhouses/{greenhouse}/readings",
            get(readings::list_greenhouse_readings),
        )
        .route("/greenhouses/{greenhouse}/daily", get(daily::get_daily))
        .route(
            "/greenhouses/{greenhouse}/charts/climogram.svg",
            get(charts::get_climogram),
        )
        .route(
            "/greenhouses/{greenhouse}/charts/co2.svg",
            get(charts::get_co2_chart),
        )
        .route("/greenhouses/{greenhouse}/report.pdf", get(report::get_report))
        .route("/readings", get(readings::list_readings));

    let write_routes_base = Router::new()
        .route("/greenhouses", post(greenhouses::create_greenhouse))
        .route(
            "/greenhouses/{greenhouse}",
            patch(greenhouses::rename_greenhouse)
                .delete(greenhouses::delete_greenhouse),
        )
        .route(
            "/greenhouses/{greenhouse}/readings",
            post(readings::create_reading),
        )
        .route("/readings/{reading_id}", delete(readings::delete_reading));

    // Combine API routes, conditionally applying rate limiting
    let api_routes = if config.disable_rate_limiting {
        Router::new()
            .merge(read_routes_base)
            .merge(write_routes_base)
    } else {
        let read_limiter = GovernorConfigBuilder::default()
            .key_extractor(FallbackIpKeyExtractor)
            .per_second(config.rate_limit_read_per_second)
            .burst_size(config.rate_limit_read_burst)
            .finish()
            .expect("Failed to create read rate limiter");

        let write_limiter = GovernorConfigBuilder::default()
            .key_extractor(FallbackIpKeyExtractor)
            .per_second(config.rate_limit_write_per_second)
            .burst_size(config.rate_limit_write_burst)
            .finish()
            .expect("Failed to create write rate limiter");

        Router::new()
            .merge(read_routes_base.layer(GovernorLayer {
                config: Arc::new(read_limiter),
            }))
            .merge(write_routes_base.layer(GovernorLayer {
                config: Arc::new(write_limiter),
            }))
    }
    .layer(RequestBodyLimitLayer::new(64 * 1024)); // 64KB body limit

    // Health check and dashboard (NO rate limiting)
    let health_routes = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/", get(dashboard::dashboard));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Combine all routes
    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
