//! HTTP API surface tests: health, station index, report form flow

mod helpers;

use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use helpers::*;
use serde_json::Value;

const REPORT_PATH: &str = "/stations/st-1/reports/soundexchange";

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _pool) = setup_app(StubLookup::failing()).await;

    let (status, body, _) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "aerial-sr");
    assert!(json["version"].is_string());
    assert!(json["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_index_lists_stations_with_report_links() {
    let (app, pool) = setup_app(StubLookup::failing()).await;
    seed_station(&pool, "st-1", "Demo Radio", "demo").await;
    seed_station(&pool, "st-2", "Night Jazz", "jazz").await;

    let (status, body, _) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Demo Radio"));
    assert!(body.contains("Night Jazz"));
    assert!(body.contains("/stations/st-1/reports/soundexchange"));
    assert!(body.contains("/stations/st-2/reports/soundexchange"));
}

#[tokio::test]
async fn test_index_without_stations() {
    let (app, _pool) = setup_app(StubLookup::failing()).await;

    let (status, body, _) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No stations configured yet"));
}

#[tokio::test]
async fn test_report_form_is_prefilled_with_previous_month() {
    let (app, pool) = setup_app(StubLookup::failing()).await;
    seed_demo_station(&pool).await;

    let (status, body, _) = get(&app, REPORT_PATH).await;

    assert_eq!(status, StatusCode::OK);

    let today = Utc::now().date_naive();
    let end_prev = today.with_day(1).unwrap().pred_opt().unwrap();
    let start_prev = end_prev.with_day(1).unwrap();
    assert!(body.contains(&format!(r#"value="{}""#, start_prev.format("%Y-%m-%d"))));
    assert!(body.contains(&format!(r#"value="{}""#, end_prev.format("%Y-%m-%d"))));
}

#[tokio::test]
async fn test_unknown_station_returns_404() {
    let (app, _pool) = setup_app(StubLookup::failing()).await;

    let (status, body, _) = get(&app, "/stations/nope/reports/soundexchange").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"]["code"], "NOT_FOUND");

    let (status, _, _) = post_form(&app, "/stations/nope/reports/soundexchange", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_date_rerenders_form() {
    let (app, pool) = setup_app(StubLookup::failing()).await;
    seed_demo_station(&pool).await;

    let (status, body, disposition) = post_form(
        &app,
        REPORT_PATH,
        "start_date=01%2F15%2F2024&end_date=2024-01-31",
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(disposition.is_none());
    assert!(body.contains("start date must be a valid YYYY-MM-DD date"));
    // The rejected value comes back so the user can correct it
    assert!(body.contains(r#"value="01/15/2024""#));
}

#[tokio::test]
async fn test_inverted_range_rerenders_form() {
    let (app, pool) = setup_app(StubLookup::failing()).await;
    seed_demo_station(&pool).await;

    let (status, body, _) = post_form(
        &app,
        REPORT_PATH,
        "start_date=2024-02-01&end_date=2024-01-01",
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("start date is after end date"));
}

#[tokio::test]
async fn test_half_specified_range_is_rejected() {
    let (app, pool) = setup_app(StubLookup::failing()).await;
    seed_demo_station(&pool).await;

    let (status, body, _) = post_form(&app, REPORT_PATH, "start_date=2024-01-01").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("end date must be a valid YYYY-MM-DD date"));
}

#[tokio::test]
async fn test_blank_dates_are_treated_as_absent() {
    let (app, pool) = setup_app(StubLookup::failing()).await;
    seed_demo_station(&pool).await;

    // Browsers submit empty inputs as empty strings, not missing fields
    let (status, _, disposition) =
        post_form(&app, REPORT_PATH, "start_date=&end_date=&fetch_isrc=").await;

    assert_eq!(status, StatusCode::OK);
    assert!(disposition.unwrap().starts_with("attachment; filename=\"DEMO"));
}
