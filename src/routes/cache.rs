//! Response caching for aggregate endpoints.
//!
//! Aggregates are recomputed from readings on every miss. Entries are keyed
//! under a per-greenhouse prefix that carries the greenhouse's write
//! generation. Every write touching a greenhouse (a reading added or deleted,
//! a rename, a delete) bumps the generation and drops the prefix. A request
//! that computed its response before a concurrent write stores it under the
//! old generation, where later lookups no longer look.
//!
//! ```text
//! gh:<id>:g<generation>:daily:<period>
//! gh:<id>:g<generation>:climogram:<period>
//! ```

use axum::{
    http::{header, HeaderValue},
    response::Response,
};
use serde::Serialize;
use std::sync::{Arc, PoisonError};

use crate::common::{AppState, CachedResponse};
use crate::error::{AppError, AppResult};

/// Build a cache key from a prefix and components.
///
/// Components are joined with `:` separator. Empty components are included
/// to ensure different queries produce different keys.
pub fn cache_key(prefix: &str, components: &[&str]) -> String {
    let mut key = prefix.to_string();
    for c in components {
        key.push(':');
        key.push_str(c);
    }
    key
}

/// Key prefix shared by every cached response of one greenhouse.
pub fn greenhouse_prefix(greenhouse_id: i32) -> String {
    format!("gh:{greenhouse_id}")
}

/// Current write generation of a greenhouse.
pub fn generation(state: &AppState, greenhouse_id: i32) -> u64 {
    state
        .cache_generations
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&greenhouse_id)
        .copied()
        .unwrap_or(0)
}

/// Cache key for a greenhouse response at its current generation.
///
/// Take the key before reading the database, so a write racing the
/// computation leaves the result under a key nobody asks for again.
pub fn greenhouse_key(state: &AppState, greenhouse_id: i32, components: &[&str]) -> String {
    let prefix = format!(
        "{}:g{}",
        greenhouse_prefix(greenhouse_id),
        generation(state, greenhouse_id)
    );
    cache_key(&prefix, components)
}

pub async fn get_cached(state: &AppState, cache_key: &str) -> Option<Arc<Vec<u8>>> {
    let cached = state.response_cache.get(cache_key).await?;
    tracing::debug!(cache_key = %cache_key, "cache_hit");
    Some(cached.data.clone())
}

pub async fn store_cached(state: &AppState, cache_key: String, data: Vec<u8>) {
    let size = data.len();
    state
        .response_cache
        .insert(
            cache_key.clone(),
            CachedResponse {
                data: Arc::new(data),
            },
        )
        .await;

    tracing::debug!(cache_key = %cache_key, size_bytes = size, "cache_stored");
}

/// Build a response with X-Cache header indicating hit/miss status.
pub fn cached_response(
    data: Vec<u8>,
    content_type: &'static str,
    cache_hit: bool,
) -> AppResult<Response> {
    let cache_header = if cache_hit { "HIT" } else { "MISS" };
    Response::builder()
        .header(header::CONTENT_TYPE, HeaderValue::from_static(content_type))
        .header("X-Cache", HeaderValue::from_static(cache_header))
        .body(axum::body::Body::from(data))
        .map_err(|e| AppError::Internal(e.to_string()))
}

pub fn json_response(data: Vec<u8>, cache_hit: bool) -> AppResult<Response> {
    cached_response(data, "application/json", cache_hit)
}

/// Serialize a response, store in cache, and return it.
///
/// The returned response carries `X-Cache: MISS` since it was just computed.
pub async fn cache_and_respond<T: Serialize>(
    state: &AppState,
    cache_key: String,
    response: &T,
) -> AppResult<Response> {
    let json_bytes = serde_json::to_vec(response)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    store_cached(state, cache_key, json_bytes.clone()).await;

    json_response(json_bytes, false)
}

/// Drop every cached response belonging to a greenhouse.
///
/// Call after the write has been committed.
pub fn invalidate_greenhouse(state: &AppState, greenhouse_id: i32) {
    *state
        .cache_generations
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(greenhouse_id)
        .or_insert(0) += 1;

    // Trailing separator so greenhouse 1 does not match greenhouse 12
    let prefix = format!("{}:", greenhouse_prefix(greenhouse_id));
    let prefix_owned = prefix.clone();
    if let Err(e) = state
        .response_cache
        .invalidate_entries_if(move |key, _| key.starts_with(&prefix_owned))
    {
        // Only possible if the cache was built without invalidation closures
        tracing::warn!(error = %e, prefix = %prefix, "cache_invalidation_failed");
        state.response_cache.invalidate_all();
        return;
    }
    tracing::debug!(prefix = %prefix, "cache_prefix_invalidated");
}
