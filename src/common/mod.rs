pub mod db;
mod state;

pub use state::{AppState, CacheGenerations, CachedResponse, ResponseCache};
