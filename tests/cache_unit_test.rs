//! Unit tests for cache module.
//!
//! Run with: cargo test --test cache_unit_test

use greenhouse_monitor::common::{db, AppState};
use greenhouse_monitor::config::Config;
use greenhouse_monitor::routes::cache;

#[test]
fn cache_key_builds_correctly() {
    // Basic key building
    assert_eq!(cache::cache_key("gh:1", &[]), "gh:1");
    assert_eq!(
        cache::cache_key("gh:1", &["daily", "2024-03"]),
        "gh:1:daily:2024-03"
    );

    // Empty components preserved (ensures query uniqueness)
    assert_ne!(
        cache::cache_key("gh:1", &["daily", "", "all"]),
        cache::cache_key("gh:1", &["daily", "all"])
    );
}

#[test]
fn greenhouse_prefix_is_not_a_prefix_of_other_ids() {
    let one = format!("{}:", cache::greenhouse_prefix(1));
    let twelve_key = cache::cache_key(&cache::greenhouse_prefix(12), &["daily", "all"]);
    assert!(!twelve_key.starts_with(&one));

    let one_key = cache::cache_key(&cache::greenhouse_prefix(1), &["daily", "all"]);
    assert!(one_key.starts_with(&one));
}

async fn state() -> AppState {
    let db = db::connect("sqlite::memory:").await.unwrap();
    AppState::new(db, Config::default())
}

#[tokio::test]
async fn response_computed_before_a_write_is_not_served_after_it() {
    let state = state().await;

    // Request starts: key taken before reading the database
    let stale_key = cache::greenhouse_key(&state, 1, &["daily", "all"]);

    // A concurrent write commits and invalidates
    cache::invalidate_greenhouse(&state, 1);

    // The slow request stores its result afterwards
    cache::store_cached(&state, stale_key.clone(), b"stale".to_vec()).await;

    let fresh_key = cache::greenhouse_key(&state, 1, &["daily", "all"]);
    assert_ne!(fresh_key, stale_key);
    assert!(cache::get_cached(&state, &fresh_key).await.is_none());
}

#[tokio::test]
async fn invalidation_is_scoped_to_one_greenhouse() {
    let state = state().await;
    let one = cache::greenhouse_key(&state, 1, &["daily", "all"]);
    let twelve = cache::greenhouse_key(&state, 12, &["daily", "all"]);
    cache::store_cached(&state, one.clone(), b"1".to_vec()).await;
    cache::store_cached(&state, twelve.clone(), b"12".to_vec()).await;

    cache::invalidate_greenhouse(&state, 1);

    assert!(cache::get_cached(&state, &one).await.is_none());
    assert_eq!(cache::get_cached(&state, &twelve).await.unwrap().as_slice(), b"12");
    assert_eq!(cache::greenhouse_key(&state, 12, &["daily", "all"]), twelve);
}
