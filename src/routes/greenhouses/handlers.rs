use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::common::AppState;
use crate::error::AppResult;
use crate::routes::cache;
use crate::store;

use super::types::{GreenhouseRequest, GreenhouseResponse};

/// List all greenhouses
#[utoipa::path(
    get,
    path = "/api/greenhouses",
    responses(
        (status = 200, description = "Greenhouses retrieved successfully", body = Vec<GreenhouseResponse>),
    ),
    tag = "greenhouses"
)]
pub async fn list_greenhouses(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<GreenhouseResponse>>> {
    let greenhouses = store::list_greenhouses(&state.db).await?;
    Ok(Json(greenhouses.into_iter().map(Into::into).collect()))
}

/// Register a new greenhouse
#[utoipa::path(
    post,
    path = "/api/greenhouses",
    request_body = GreenhouseRequest,
    responses(
        (status = 201, description = "Greenhouse created", body = GreenhouseResponse),
        (status = 400, description = "Empty or oversized name"),
        (status = 409, description = "A greenhouse with that name already exists"),
    ),
    tag = "greenhouses"
)]
pub async fn create_greenhouse(
    State(state): State<AppState>,
    Json(body): Json<GreenhouseRequest>,
) -> AppResult<(StatusCode, Json<GreenhouseResponse>)> {
    let greenhouse = store::create_greenhouse(&state.db, &body.name).await?;
    Ok((StatusCode::CREATED, Json(greenhouse.into())))
}

/// Get a specific greenhouse by ID or name
#[utoipa::path(
    get,
    path = "/api/greenhouses/{greenhouse}",
    params(
        ("greenhouse" = String, Path, description = "Greenhouse id or name"),
    ),
    responses(
        (status = 200, description = "Greenhouse retrieved successfully", body = GreenhouseResponse),
        (status = 404, description = "Greenhouse not found"),
    ),
    tag = "greenhouses"
)]
pub async fn get_greenhouse(
    State(state): State<AppState>,
    Path(greenhouse): Path<String>,
) -> AppResult<Json<GreenhouseResponse>> {
    let greenhouse = store::resolve_greenhouse(&state.db, &greenhouse).await?;
    Ok(Json(greenhouse.into()))
}

/// Rename a greenhouse
#[utoipa::path(
    patch,
    path = "/api/greenhouses/{greenhouse}",
    params(
        ("greenhouse" = String, Path, description = "Greenhouse id or name"),
    ),
    request_body = GreenhouseRequest,
    responses(
        (status = 200, description = "Greenhouse renamed", body = GreenhouseResponse),
        (status = 400, description = "Empty or oversized name"),
        (status = 404, description = "Greenhouse not found"),
        (status = 409, description = "Another greenhouse already uses that name"),
    ),
    tag = "greenhouses"
)]
pub async fn rename_greenhouse(
    State(state): State<AppState>,
    Path(greenhouse): Path<String>,
    Json(body): Json<GreenhouseRequest>,
) -> AppResult<Json<GreenhouseResponse>> {
    let existing = store::resolve_greenhouse(&state.db, &greenhouse).await?;
    let renamed = store::rename_greenhouse(&state.db, existing.id, &body.name).await?;

    // Chart captions carry the name
    cache::invalidate_greenhouse(&state, renamed.id);

    Ok(Json(renamed.into()))
}

/// Delete a greenhouse and all of its readings
#[utoipa::path(
    delete,
    path = "/api/greenhouses/{greenhouse}",
    params(
        ("greenhouse" = String, Path, description = "Greenhouse id or name"),
    ),
    responses(
        (status = 204, description = "Greenhouse and its readings deleted"),
        (status = 404, description = "Greenhouse not found"),
    ),
    tag = "greenhouses"
)]
pub async fn delete_greenhouse(
    State(state): State<AppState>,
    Path(greenhouse): Path<String>,
) -> AppResult<StatusCode> {
    let existing = store::resolve_greenhouse(&state.db, &greenhouse).await?;
    store::delete_greenhouse(&state.db, existing.id).await?;
    cache::invalidate_greenhouse(&state, existing.id);

    Ok(StatusCode::NO_CONTENT)
}
