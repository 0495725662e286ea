use axum::{
    extract::{Path, Query, State},
    http::header::{self, HeaderValue},
    response::Response,
};

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::period::PeriodQuery;
use crate::report::{self, ReportData};
use crate::store::{self, ReadingFilter};

/// PDF report of a greenhouse for a period
///
/// Summary and both charts on the first page, then every reading of the
/// period in chronological order.
#[utoipa::path(
    get,
    path = "/api/greenhouses/{greenhouse}/report.pdf",
    params(
        ("greenhouse" = String, Path, description = "Greenhouse id or name"),
        PeriodQuery
    ),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf", body = Vec<u8>),
        (status = 400, description = "Invalid period"),
        (status = 404, description = "Greenhouse not found"),
    ),
    tag = "reports"
)]
pub async fn get_report(
    State(state): State<AppState>,
    Path(greenhouse): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Response> {
    let greenhouse = store::resolve_greenhouse(&state.db, &greenhouse).await?;
    let period = query.period()?;
    let rows = store::list_readings(&state.db, ReadingFilter::greenhouse(greenhouse.id, period))
        .await?;

    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
    let data = ReportData::build(&greenhouse, period, rows, generated_at);
    let file_name = data.file_name();

    // Layout and chart drawing are CPU bound
    let started = std::time::Instant::now();
    let pdf = tokio::task::spawn_blocking(move || report::render_pdf(&data))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    tracing::info!(
        greenhouse_id = greenhouse.id,
        period = %period.slug(),
        size_bytes = pdf.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Report generated"
    );

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Response::builder()
        .header(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"))
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(axum::body::Body::from(pdf))
        .map_err(|e| AppError::Internal(e.to_string()))
}
