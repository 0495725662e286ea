//! End-to-end tests through the router with an in-memory database.
//!
//! Run with: cargo test --test api_test

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use greenhouse_monitor::common::{db, AppState};
use greenhouse_monitor::config::Config;
use greenhouse_monitor::routes::build_router;

async fn app() -> Router {
    let db = db::connect("sqlite::memory:").await.unwrap();
    let config = Config {
        disable_rate_limiting: true,
        ..Config::default()
    };
    build_router(AppState::new(db, config))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

async fn create_greenhouse(app: &Router, name: &str) -> i64 {
    let (status, body) = send(app, Method::POST, "/api/greenhouses", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    json_body(&body)["id"].as_i64().unwrap()
}

fn reading(date: &str, temp: (f64, f64), humidity: (f64, f64), co2: Option<f64>) -> Value {
    json!({
        "date": date,
        "time": "09:00",
        "temp_max": temp.0,
        "temp_min": temp.1,
        "humidity_max": humidity.0,
        "humidity_min": humidity.1,
        "co2": co2,
    })
}

#[tokio::test]
async fn health_and_dashboard() {
    let app = app().await;
    let (status, _) = send(&app, Method::GET, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("Greenhouse Monitor"));
}

#[tokio::test]
async fn greenhouse_lifecycle() {
    let app = app().await;
    let id = create_greenhouse(&app, "Norte").await;

    let (status, body) = send(&app, Method::POST, "/api/greenhouses", Some(json!({ "name": "NORTE" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json_body(&body)["error"].is_string());

    let (status, _) = send(&app, Method::POST, "/api/greenhouses", Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/greenhouses/norte", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["id"].as_i64(), Some(id));

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/greenhouses/{id}"),
        Some(json!({ "name": "Norte 2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["name"], "Norte 2");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/greenhouses/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/api/greenhouses/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/api/greenhouses", None).await;
    assert_eq!(json_body(&body), json!([]));
}

#[tokio::test]
async fn readings_history_and_delete() {
    let app = app().await;
    let id = create_greenhouse(&app, "Sur").await;
    let uri = format!("/api/greenhouses/{id}/readings");

    let (status, body) = send(&app, Method::POST, &uri, Some(reading("2024-03-01", (25.0, 15.0), (80.0, 60.0), Some(600.0)))).await;
    assert_eq!(status, StatusCode::CREATED);
    let created = json_body(&body);
    assert_eq!(created["avg_temp"], 20.0);
    assert_eq!(created["avg_humidity"], 70.0);
    assert_eq!(created["greenhouse"], "Sur");

    send(&app, Method::POST, &uri, Some(reading("2024-04-01", (25.0, 15.0), (80.0, 60.0), None))).await;
    send(&app, Method::POST, &uri, Some(reading("2023-11-15", (25.0, 15.0), (80.0, 60.0), None))).await;

    // Inverted range
    let (status, _) = send(&app, Method::POST, &uri, Some(reading("2024-03-02", (10.0, 15.0), (80.0, 60.0), None))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, Method::GET, &format!("{uri}?month=marzo&year=2024"), None).await;
    assert_eq!(json_body(&body).as_array().unwrap().len(), 1);

    // "todos" ignores the year the dashboard always sends
    let (_, body) = send(&app, Method::GET, "/api/readings?greenhouse=sur&month=todos&year=2024", None).await;
    assert_eq!(json_body(&body).as_array().unwrap().len(), 3);

    let (_, body) = send(&app, Method::GET, "/api/readings?greenhouse=SUR&year=2024", None).await;
    assert_eq!(json_body(&body).as_array().unwrap().len(), 2);

    let (status, _) = send(&app, Method::GET, &format!("{uri}?month=smarch"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let reading_id = created["id"].as_i64().unwrap();
    let (status, _) = send(&app, Method::DELETE, &format!("/api/readings/{reading_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/readings/{reading_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(json_body(&body).as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn csv_export() {
    let app = app().await;
    let id = create_greenhouse(&app, "Este").await;
    let uri = format!("/api/greenhouses/{id}/readings");
    send(&app, Method::POST, &uri, Some(reading("2024-03-01", (25.0, 15.0), (80.0, 60.0), None))).await;

    let (status, body) = send(&app, Method::GET, &format!("{uri}?format=csv"), None).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("date,time,temp_max,temp_min,humidity_max,humidity_min,co2")
    );
    assert_eq!(lines.next(), Some("2024-03-01,09:00,25,15,80,60,"));
    assert_eq!(lines.next(), None);
}

#[tokio::test]
async fn daily_aggregates_are_cached_and_invalidated() {
    let app = app().await;
    let id = create_greenhouse(&app, "Oeste").await;
    let uri = format!("/api/greenhouses/{id}/readings");
    send(&app, Method::POST, &uri, Some(reading("2024-03-01", (20.0, 10.0), (80.0, 60.0), Some(500.0)))).await;
    send(&app, Method::POST, &uri, Some(reading("2024-03-01", (30.0, 20.0), (90.0, 70.0), Some(700.0)))).await;

    let daily = format!("/api/greenhouses/{id}/daily?month=3&year=2024");
    let request = || Request::builder().uri(&daily).body(Body::empty()).unwrap();

    let first = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(first.headers()["x-cache"], "MISS");
    let body = axum::body::to_bytes(first.into_body(), usize::MAX).await.unwrap();
    let value = json_body(&body);
    assert_eq!(value["days"].as_array().unwrap().len(), 1);
    assert_eq!(value["days"][0]["avg_temp"], 20.0);
    assert_eq!(value["summary"]["avg_co2"], 600.0);
    assert_eq!(value["period"], "March 2024");

    let second = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(second.headers()["x-cache"], "HIT");

    send(&app, Method::POST, &uri, Some(reading("2024-03-02", (20.0, 10.0), (80.0, 60.0), None))).await;
    let third = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(third.headers()["x-cache"], "MISS");
    let body = axum::body::to_bytes(third.into_body(), usize::MAX).await.unwrap();
    assert_eq!(json_body(&body)["days"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn charts_and_report() {
    let app = app().await;
    let id = create_greenhouse(&app, "Invernadero Sur").await;
    let uri = format!("/api/greenhouses/{id}/readings");
    send(&app, Method::POST, &uri, Some(reading("2024-03-01", (25.0, 15.0), (80.0, 60.0), Some(650.0)))).await;

    let (status, body) = send(&app, Method::GET, &format!("/api/greenhouses/{id}/charts/climogram.svg?month=3&year=2024"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("Climogram - Invernadero Sur"));

    let (status, _) = send(&app, Method::GET, &format!("/api/greenhouses/{id}/charts/co2.svg"), None).await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/greenhouses/{id}/report.pdf?month=3&year=2024"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"report-invernadero-sur-2024-03.pdf\""
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.starts_with(b"%PDF"));
}
