use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::analytics::{self, DailySummary, PeriodSummary};
use crate::common::AppState;
use crate::error::AppResult;
use crate::period::{Period, PeriodQuery};
use crate::routes::cache;
use crate::routes::greenhouses::GreenhouseResponse;
use crate::store::{self, ReadingFilter};

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyResponse {
    pub greenhouse: GreenhouseResponse,
    /// Human-readable period, e.g. "March 2024"
    pub period: String,
    pub summary: PeriodSummary,
    /// One entry per day with readings, oldest first
    pub days: Vec<DailySummary>,
}

/// Daily aggregates of one greenhouse over a period.
pub(crate) async fn load_days(
    state: &AppState,
    greenhouse_id: i32,
    period: Period,
) -> AppResult<Vec<DailySummary>> {
    let rows = store::list_readings(&state.db, ReadingFilter::greenhouse(greenhouse_id, period))
        .await?;
    Ok(analytics::daily_summaries(&rows))
}

/// Daily aggregates for a greenhouse
///
/// Readings of the same calendar day collapse into one entry. The summary
/// averages the daily means, so busy days do not outweigh quiet ones.
#[utoipa::path(
    get,
    path = "/api/greenhouses/{greenhouse}/daily",
    params(
        ("greenhouse" = String, Path, description = "Greenhouse id or name"),
        PeriodQuery
    ),
    responses(
        (status = 200, description = "Aggregates computed", body = DailyResponse),
        (status = 400, description = "Invalid period"),
        (status = 404, description = "Greenhouse not found"),
    ),
    tag = "aggregates"
)]
pub async fn get_daily(
    State(state): State<AppState>,
    Path(greenhouse): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Response> {
    let resolved = store::resolve_greenhouse(&state.db, &greenhouse).await?;
    let period = query.period()?;
    let cache_key = cache::greenhouse_key(&state, resolved.id, &["daily", &period.slug()]);

    if let Some(cached) = cache::get_cached(&state, &cache_key).await {
        return cache::json_response((*cached).to_vec(), true);
    }

    let days = load_days(&state, resolved.id, period).await?;

    let response = DailyResponse {
        greenhouse: resolved.into(),
        period: period.to_string(),
        summary: analytics::period_summary(&days),
        days,
    };

    cache::cache_and_respond(&state, cache_key, &response).await
}
