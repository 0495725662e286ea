//! Storage tests against an in-memory SQLite database.
//!
//! Run with: cargo test --test store_test

use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

use greenhouse_monitor::common::db;
use greenhouse_monitor::error::AppError;
use greenhouse_monitor::period::Period;
use greenhouse_monitor::store::{self, NewReading, ReadingFilter};

async fn setup() -> DatabaseConnection {
    db::connect("sqlite::memory:").await.unwrap()
}

fn reading(date: (i32, u32, u32), time: Option<&str>) -> NewReading {
    NewReading {
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        time: time.map(str::to_string),
        temp_max: 25.0,
        temp_min: 18.0,
        humidity_max: 80.0,
        humidity_min: 60.0,
        co2: Some(600.0),
    }
}

#[tokio::test]
async fn created_greenhouse_is_found_ignoring_case() {
    let db = setup().await;
    let created = store::create_greenhouse(&db, "Invernadero Norte").await.unwrap();

    let found = store::find_greenhouse_by_name(&db, "invernadero NORTE")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, created.id);

    let by_id = store::resolve_greenhouse(&db, &created.id.to_string()).await.unwrap();
    assert_eq!(by_id.name, "Invernadero Norte");
}

#[tokio::test]
async fn exact_and_unknown_names() {
    let db = setup().await;
    let created = store::create_greenhouse(&db, "Norte").await.unwrap();

    let found = store::find_greenhouse_by_name(&db, "Norte").await.unwrap();
    assert_eq!(found.map(|g| g.id), Some(created.id));

    let missing = store::find_greenhouse_by_name(&db, "Sur").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn numeric_names_resolve_when_no_such_id() {
    let db = setup().await;
    store::create_greenhouse(&db, "Norte").await.unwrap();
    let numbered = store::create_greenhouse(&db, "2024").await.unwrap();

    let resolved = store::resolve_greenhouse(&db, "2024").await.unwrap();
    assert_eq!(resolved.id, numbered.id);

    // An existing id still wins over a name
    let by_id = store::resolve_greenhouse(&db, "1").await.unwrap();
    assert_eq!(by_id.name, "Norte");
}

#[tokio::test]
async fn non_ascii_names_fold_case() {
    let db = setup().await;
    let created = store::create_greenhouse(&db, "Ñandú").await.unwrap();

    let found = store::resolve_greenhouse(&db, "ÑANDÚ").await.unwrap();
    assert_eq!(found.id, created.id);

    let err = store::create_greenhouse(&db, "ñandú").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn duplicate_names_conflict() {
    let db = setup().await;
    store::create_greenhouse(&db, "Sur").await.unwrap();

    let err = store::create_greenhouse(&db, "  sur ").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let listed = store::list_greenhouses(&db).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn rename_rejects_taken_names_but_allows_case_change() {
    let db = setup().await;
    let norte = store::create_greenhouse(&db, "Norte").await.unwrap();
    store::create_greenhouse(&db, "Sur").await.unwrap();

    let err = store::rename_greenhouse(&db, norte.id, "SUR").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let renamed = store::rename_greenhouse(&db, norte.id, "NORTE").await.unwrap();
    assert_eq!(renamed.name, "NORTE");

    let err = store::rename_greenhouse(&db, 999, "Este").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn deleting_greenhouse_removes_its_readings_only() {
    let db = setup().await;
    let a = store::create_greenhouse(&db, "A").await.unwrap();
    let b = store::create_greenhouse(&db, "B").await.unwrap();

    for day in 1..=3 {
        store::add_reading(&db, a.id, &reading((2024, 3, day), None)).await.unwrap();
    }
    store::add_reading(&db, b.id, &reading((2024, 3, 1), None)).await.unwrap();

    let removed = store::delete_greenhouse(&db, a.id).await.unwrap();
    assert_eq!(removed, 3);

    let left = store::list_readings(
        &db,
        ReadingFilter {
            greenhouse_id: None,
            period: Period::All,
        },
    )
    .await
    .unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].greenhouse_id, b.id);

    let err = store::resolve_greenhouse(&db, "A").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn readings_listed_newest_first() {
    let db = setup().await;
    let gh = store::create_greenhouse(&db, "Norte").await.unwrap();

    store::add_reading(&db, gh.id, &reading((2024, 3, 1), Some("08:00"))).await.unwrap();
    store::add_reading(&db, gh.id, &reading((2024, 3, 2), Some("08:00"))).await.unwrap();
    store::add_reading(&db, gh.id, &reading((2024, 3, 2), Some("18:30:15"))).await.unwrap();

    let rows = store::list_readings(&db, ReadingFilter::greenhouse(gh.id, Period::All))
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);

    let order: Vec<(String, Option<String>)> = rows
        .iter()
        .map(|r| (r.date.to_string(), r.time.clone()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("2024-03-02".to_string(), Some("18:30".to_string())),
            ("2024-03-02".to_string(), Some("08:00".to_string())),
            ("2024-03-01".to_string(), Some("08:00".to_string())),
        ]
    );
}

#[tokio::test]
async fn month_filter_uses_calendar_bounds() {
    let db = setup().await;
    let gh = store::create_greenhouse(&db, "Norte").await.unwrap();

    for date in [(2024, 2, 29), (2024, 3, 1), (2024, 3, 31), (2024, 4, 1), (2023, 3, 15)] {
        store::add_reading(&db, gh.id, &reading(date, None)).await.unwrap();
    }

    let march = store::list_readings(
        &db,
        ReadingFilter::greenhouse(gh.id, Period::Month { year: 2024, month: 3 }),
    )
    .await
    .unwrap();
    assert_eq!(march.len(), 2);

    let year = store::list_readings(&db, ReadingFilter::greenhouse(gh.id, Period::Year(2024)))
        .await
        .unwrap();
    assert_eq!(year.len(), 4);
}

#[tokio::test]
async fn deleting_one_reading() {
    let db = setup().await;
    let gh = store::create_greenhouse(&db, "Norte").await.unwrap();
    let first = store::add_reading(&db, gh.id, &reading((2024, 3, 1), None)).await.unwrap();
    store::add_reading(&db, gh.id, &reading((2024, 3, 2), None)).await.unwrap();

    let removed = store::delete_reading(&db, first.id).await.unwrap();
    assert_eq!(removed.id, first.id);

    let rows = store::list_readings(&db, ReadingFilter::greenhouse(gh.id, Period::All))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);

    let err = store::delete_reading(&db, first.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn readings_for_unknown_greenhouse_are_rejected() {
    let db = setup().await;
    let err = store::add_reading(&db, 42, &reading((2024, 3, 1), None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
