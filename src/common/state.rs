use moka::future::Cache;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::config::Config;

/// Cached response body
#[derive(Clone)]
pub struct CachedResponse {
    pub data: Arc<Vec<u8>>,
}

/// Cache for API responses. Key is request params, value is serialized response.
/// Weighted by byte size to enforce memory limit.
pub type ResponseCache = Cache<String, CachedResponse>;

/// Write generation per greenhouse, part of every cache key of that greenhouse
pub type CacheGenerations = Arc<RwLock<HashMap<i32, u64>>>;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub response_cache: ResponseCache,
    pub cache_generations: CacheGenerations,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        // Cache weighted by byte size, not entry count
        let cache: ResponseCache = Cache::builder()
            .weigher(|_key: &String, value: &CachedResponse| -> u32 {
                value.data.len().try_into().unwrap_or(u32::MAX)
            })
            .max_capacity(config.cache_max_bytes)
            .time_to_live(Duration::from_secs(config.cache_ttl_seconds))
            // Writes drop every entry of the touched greenhouse by key prefix
            .support_invalidation_closures()
            .build();

        Self {
            db,
            config: Arc::new(config),
            response_cache: cache,
            cache_generations: CacheGenerations::default(),
        }
    }
}
