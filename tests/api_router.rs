//! Router tests that stop before the database

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Request, StatusCode,
    },
    Router,
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use workhours_server::{
    api,
    models::{UserClaims, WeeklyTemplate},
    repository::Repository,
    AppConfig, AppState,
};

fn app() -> (Router, AppConfig) {
    let config = AppConfig::default();
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("lazy pool");
    let state = AppState::new(config.clone(), Repository::new(pool));
    (api::create_router(state), config)
}

fn bearer(config: &AppConfig) -> String {
    let now = chrono::Utc::now().timestamp();
    let token = UserClaims {
        sub: "router-test".to_string(),
        email: None,
        exp: now + 600,
        iat: now,
    }
    .create_token(&config.auth.jwt_secret)
    .unwrap();
    format!("Bearer {}", token)
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::get("/api/v1/working-hours/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "NotAuthorized");
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_unauthorized() {
    let (app, mut config) = app();
    config.auth.jwt_secret = "someone-else".to_string();
    let response = app
        .oneshot(
            Request::get("/api/v1/working-hours/me")
                .header(AUTHORIZATION, bearer(&config))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bad_date_is_rejected_before_lookup() {
    let (app, config) = app();
    let response = app
        .oneshot(
            Request::get("/api/v1/working-hours/me/availability?date=07-01-2024")
                .header(AUTHORIZATION, bearer(&config))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "InvalidDate");
    assert_eq!(body["message"], "Invalid date '07-01-2024' (use YYYY-MM-DD)");
}

#[tokio::test]
async fn test_calendar_rejects_bad_bounds() {
    let (app, config) = app();
    let response = app
        .oneshot(
            Request::get("/api/v1/working-hours/me/calendar?from=2024-07-01&to=2024-13-01")
                .header(AUTHORIZATION, bearer(&config))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_openapi_document_lists_working_hours() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    assert!(doc["paths"]["/working-hours/me/availability"].is_object());
}

#[tokio::test]
async fn test_put_rejects_unknown_timezone_before_storing() {
    let (app, config) = app();
    let document = json!({
        "timezone": "Mars/Olympus",
        "weekly": serde_json::to_value(WeeklyTemplate::default()).unwrap(),
        "overrides": [],
    });
    let response = app
        .oneshot(
            Request::put("/api/v1/working-hours/me")
                .header(AUTHORIZATION, bearer(&config))
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(document.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "BadValue");
    assert_eq!(body["message"], "Unknown timezone 'Mars/Olympus'");
}
