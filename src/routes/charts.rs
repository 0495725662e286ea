use axum::{
    extract::{Path, Query, State},
    response::Response,
};

use crate::charts;
use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::period::PeriodQuery;
use crate::report::ReportError;
use crate::routes::cache;
use crate::routes::daily::load_days;
use crate::store;

const SVG: &str = "image/svg+xml";

/// Climogram: daily mean temperature over daily mean humidity
#[utoipa::path(
    get,
    path = "/api/greenhouses/{greenhouse}/charts/climogram.svg",
    params(
        ("greenhouse" = String, Path, description = "Greenhouse id or name"),
        PeriodQuery
    ),
    responses(
        (status = 200, description = "SVG chart", content_type = "image/svg+xml", body = String),
        (status = 400, description = "Invalid period"),
        (status = 404, description = "Greenhouse not found"),
    ),
    tag = "charts"
)]
pub async fn get_climogram(
    State(state): State<AppState>,
    Path(greenhouse): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Response> {
    let greenhouse = store::resolve_greenhouse(&state.db, &greenhouse).await?;
    let period = query.period()?;
    let cache_key = cache::greenhouse_key(&state, greenhouse.id, &["climogram", &period.slug()]);

    if let Some(cached) = cache::get_cached(&state, &cache_key).await {
        return cache::cached_response((*cached).to_vec(), SVG, true);
    }

    let days = load_days(&state, greenhouse.id, period).await?;
    let svg = charts::climogram_svg(&greenhouse.name, &days)
        .map_err(|e| AppError::Report(ReportError::Chart(e)))?
        .into_bytes();

    cache::store_cached(&state, cache_key, svg.clone()).await;
    cache::cached_response(svg, SVG, false)
}

/// Daily mean CO2 concentration
#[utoipa::path(
    get,
    path = "/api/greenhouses/{greenhouse}/charts/co2.svg",
    params(
        ("greenhouse" = String, Path, description = "Greenhouse id or name"),
        PeriodQuery
    ),
    responses(
        (status = 200, description = "SVG chart", content_type = "image/svg+xml", body = String),
        (status = 400, description = "Invalid period"),
        (status = 404, description = "Greenhouse not found"),
    ),
    tag = "charts"
)]
pub async fn get_co2_chart(
    State(state): State<AppState>,
    Path(greenhouse): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Response> {
    let greenhouse = store::resolve_greenhouse(&state.db, &greenhouse).await?;
    let period = query.period()?;
    let cache_key = cache::greenhouse_key(&state, greenhouse.id, &["co2", &period.slug()]);

    if let Some(cached) = cache::get_cached(&state, &cache_key).await {
        return cache::cached_response((*cached).to_vec(), SVG, true);
    }

    let days = load_days(&state, greenhouse.id, period).await?;
    let svg = charts::co2_svg(&days)
        .map_err(|e| AppError::Report(ReportError::Chart(e)))?
        .into_bytes();

    cache::store_cached(&state, cache_key, svg.clone()).await;
    cache::cached_response(svg, SVG, false)
}
