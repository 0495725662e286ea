use axum::{
    extract::{Path, Query, State},
    http::{
        header::{self, HeaderMap, HeaderValue},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio_stream::wrappers::ReceiverStream;
use utoipa::{IntoParams, ToSchema};

use crate::common::AppState;
use crate::entity::readings;
use crate::error::{AppError, AppResult};
use crate::period::PeriodQuery;
use crate::routes::cache;
use crate::store::{self, NewReading, ReadingFilter};

const CSV_HEADER: [&str; 7] = [
    "date",
    "time",
    "temp_max",
    "temp_min",
    "humidity_max",
    "humidity_min",
    "co2",
];

fn default_format() -> String {
    "json".to_string()
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReadingResponse {
    pub id: i32,
    pub greenhouse_id: i32,
    /// Greenhouse name
    pub greenhouse: String,
    pub date: NaiveDate,
    /// Time of day (`HH:MM`), absent on rows recorded before times were kept
    pub time: Option<String>,
    pub temp_max: f64,
    pub temp_min: f64,
    pub humidity_max: f64,
    pub humidity_min: f64,
    pub co2: Option<f64>,
    /// Midpoint of the temperature range
    pub avg_temp: f64,
    /// Midpoint of the humidity range
    pub avg_humidity: f64,
}

impl ReadingResponse {
    fn new(r: readings::Model, greenhouse: String) -> Self {
        Self {
            avg_temp: r.avg_temp(),
            avg_humidity: r.avg_humidity(),
            id: r.id,
            greenhouse_id: r.greenhouse_id,
            greenhouse,
            date: r.date,
            time: r.time,
            temp_max: r.temp_max,
            temp_min: r.temp_min,
            humidity_max: r.humidity_max,
            humidity_min: r.humidity_min,
            co2: r.co2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Csv,
}

fn determine_format(query_format: &str, headers: &HeaderMap) -> AppResult<Format> {
    // Query parameter takes precedence
    match query_format.to_lowercase().as_str() {
        "csv" => return Ok(Format::Csv),
        "json" => {}
        other => {
            return Err(AppError::BadRequest(format!(
                "Unsupported format '{other}', expected json or csv"
            )));
        }
    }

    if let Some(accept) = headers.get(header::ACCEPT)
        && let Ok(accept_str) = accept.to_str()
        && accept_str.contains("text/csv")
    {
        return Ok(Format::Csv);
    }

    Ok(Format::Json)
}

fn csv_record(r: &readings::Model) -> [String; 7] {
    [
        r.date.to_string(),
        r.time.clone().unwrap_or_default(),
        r.temp_max.to_string(),
        r.temp_min.to_string(),
        r.humidity_max.to_string(),
        r.humidity_min.to_string(),
        r.co2.map(|v| v.to_string()).unwrap_or_default(),
    ]
}

fn csv_line<I, T>(record: I) -> Result<Vec<u8>, csv::Error>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(record)?;
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

fn build_csv_response(rows: Vec<readings::Model>, file_name: &str) -> AppResult<Response> {
    let (tx, rx) = tokio::sync::mpsc::channel::<Result<Vec<u8>, std::io::Error>>(100);

    tokio::spawn(async move {
        let lines = std::iter::once(csv_line(CSV_HEADER))
            .chain(rows.iter().map(|r| csv_line(csv_record(r))));
        for line in lines {
            let chunk = line.map_err(std::io::Error::other);
            if tx.send(chunk).await.is_err() {
                break;
            }
        }
    });

    let stream = ReceiverStream::new(rx);
    let body = axum::body::Body::from_stream(stream);
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Response::builder()
        .header(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"))
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Month: 1-12, a Spanish or English month name, or "todos"/"all"
    pub month: Option<String>,
    /// Calendar year
    pub year: Option<i32>,
    /// Response format: json (default), csv
    #[serde(default = "default_format")]
    pub format: String,
}

/// Reading history of one greenhouse
///
/// Newest first. Supports JSON and CSV; CSV is also selected by an
/// `Accept: text/csv` header.
#[utoipa::path(
    get,
    path = "/api/greenhouses/{greenhouse}/readings",
    params(
        ("greenhouse" = String, Path, description = "Greenhouse id or name"),
        HistoryQuery
    ),
    responses(
        (status = 200, description = "Readings retrieved successfully", body = Vec<ReadingResponse>),
        (status = 400, description = "Invalid period or format"),
        (status = 404, description = "Greenhouse not found"),
    ),
    tag = "readings"
)]
pub async fn list_greenhouse_readings(
    State(state): State<AppState>,
    Path(greenhouse): Path<String>,
    Query(query): Query<HistoryQuery>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let greenhouse = store::resolve_greenhouse(&state.db, &greenhouse).await?;
    let period = PeriodQuery {
        month: query.month,
        year: query.year,
    }
    .period()?;
    let format = determine_format(&query.format, &headers)?;

    let rows = store::list_readings(&state.db, ReadingFilter::greenhouse(greenhouse.id, period))
        .await?;

    tracing::debug!(
        greenhouse_id = greenhouse.id,
        period = %period.slug(),
        rows = rows.len(),
        ?format,
        "History requested"
    );

    match format {
        Format::Csv => build_csv_response(
            rows,
            &format!("readings-{}-{}.csv", greenhouse.id, period.slug()),
        ),
        Format::Json => {
            let response: Vec<ReadingResponse> = rows
                .into_iter()
                .map(|r| ReadingResponse::new(r, greenhouse.name.clone()))
                .collect();
            Ok(Json(response).into_response())
        }
    }
}

/// Record a reading for a greenhouse
#[utoipa::path(
    post,
    path = "/api/greenhouses/{greenhouse}/readings",
    params(
        ("greenhouse" = String, Path, description = "Greenhouse id or name"),
    ),
    request_body = NewReading,
    responses(
        (status = 201, description = "Reading stored", body = ReadingResponse),
        (status = 400, description = "Invalid reading"),
        (status = 404, description = "Greenhouse not found"),
    ),
    tag = "readings"
)]
pub async fn create_reading(
    State(state): State<AppState>,
    Path(greenhouse): Path<String>,
    Json(body): Json<NewReading>,
) -> AppResult<(StatusCode, Json<ReadingResponse>)> {
    let greenhouse = store::resolve_greenhouse(&state.db, &greenhouse).await?;
    let reading = store::add_reading(&state.db, greenhouse.id, &body).await?;
    cache::invalidate_greenhouse(&state, greenhouse.id);

    Ok((
        StatusCode::CREATED,
        Json(ReadingResponse::new(reading, greenhouse.name)),
    ))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReadingsQuery {
    /// Restrict to one greenhouse (id or name)
    pub greenhouse: Option<String>,
    /// Month: 1-12, a Spanish or English month name, or "todos"/"all"
    pub month: Option<String>,
    /// Calendar year
    pub year: Option<i32>,
}

/// List readings across greenhouses
///
/// Newest first, optionally narrowed to one greenhouse and a period.
#[utoipa::path(
    get,
    path = "/api/readings",
    params(ReadingsQuery),
    responses(
        (status = 200, description = "Readings retrieved successfully", body = Vec<ReadingResponse>),
        (status = 400, description = "Invalid period"),
        (status = 404, description = "Greenhouse not found"),
    ),
    tag = "readings"
)]
pub async fn list_readings(
    State(state): State<AppState>,
    Query(query): Query<ReadingsQuery>,
) -> AppResult<Json<Vec<ReadingResponse>>> {
    let period = PeriodQuery {
        month: query.month,
        year: query.year,
    }
    .period()?;

    let greenhouse_id = match query.greenhouse.as_deref() {
        Some(g) if !g.trim().is_empty() => {
            Some(store::resolve_greenhouse(&state.db, g.trim()).await?.id)
        }
        _ => None,
    };

    let names: HashMap<i32, String> = store::list_greenhouses(&state.db)
        .await?
        .into_iter()
        .map(|g| (g.id, g.name))
        .collect();

    let rows = store::list_readings(
        &state.db,
        ReadingFilter {
            greenhouse_id,
            period,
        },
    )
    .await?;

    let response = rows
        .into_iter()
        .map(|r| {
            let name = names.get(&r.greenhouse_id).cloned().unwrap_or_default();
            ReadingResponse::new(r, name)
        })
        .collect();

    Ok(Json(response))
}

/// Delete one reading by id
#[utoipa::path(
    delete,
    path = "/api/readings/{reading_id}",
    params(
        ("reading_id" = i32, Path, description = "Reading id"),
    ),
    responses(
        (status = 204, description = "Reading deleted"),
        (status = 404, description = "Reading not found"),
    ),
    tag = "readings"
)]
pub async fn delete_reading(
    State(state): State<AppState>,
    Path(reading_id): Path<i32>,
) -> AppResult<StatusCode> {
    let removed = store::delete_reading(&state.db, reading_id).await?;
    cache::invalidate_greenhouse(&state, removed.greenhouse_id);

    Ok(StatusCode::NO_CONTENT)
}
