//! API integration tests against a running server

use reqwest::Client;
use serde_json::{json, Value};
use workhours_server::models::UserClaims;

const BASE_URL: &str = "http://localhost:8000/api/v1";

/// Mint a token the running server accepts
fn auth_token(sub: &str) -> String {
    let secret = std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| "change-this-secret-in-production".to_string());
    let now = chrono::Utc::now().timestamp();
    UserClaims {
        sub: sub.to_string(),
        email: None,
        exp: now + 3600,
        iat: now,
    }
    .create_token(&secret)
    .expect("Failed to create token")
}

fn unique_sub() -> String {
    format!("it-{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

fn weekly(enabled: [bool; 7]) -> Value {
    let names = ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"];
    Value::Array(
        names
            .iter()
            .zip(enabled)
            .map(|(day, enabled)| json!({"day": day, "enabled": enabled, "start": "09:00", "end": "17:00"}))
            .collect(),
    )
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_working_hours_requires_auth() {
    let client = Client::new();

    let response = client
        .get(format!("{}/working-hours/me", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_new_user_gets_default_schedule() {
    let client = Client::new();
    let token = auth_token(&unique_sub());

    let response = client
        .get(format!("{}/working-hours/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["weekly"].as_array().map(Vec::len), Some(7));
    assert_eq!(body["weekly"][1]["enabled"], true);
    assert_eq!(body["overrides"], json!([]));

    let response = client
        .get(format!("{}/working-hours/me/availability?date=2024-07-01", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["reason"], "not_configured");
}

#[tokio::test]
#[ignore]
async fn test_save_and_resolve() {
    let client = Client::new();
    let token = auth_token(&unique_sub());

    let response = client
        .put(format!("{}/working-hours/me", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "timezone": "Europe/Paris",
            "weekly": weekly([false, true, false, false, false, false, false]),
            "overrides": [
                {"date": "2024-07-04", "enabled": false, "start": "09:00", "end": "17:00"},
                {"date": "2024-07-06", "enabled": true, "start": "10:00", "end": "12:00"}
            ]
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/working-hours/me/calendar?from=2024-07-01&to=2024-07-07", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let days: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["status"], "open");
    assert_eq!(days[1]["reason"], "day_off");
    assert_eq!(days[3]["reason"], "override_closed");
    assert_eq!(days[5]["start"], "10:00");
    assert_eq!(days[5]["overridden"], true);
}

#[tokio::test]
#[ignore]
async fn test_malformed_document_is_rejected() {
    let client = Client::new();
    let token = auth_token(&unique_sub());

    let response = client
        .put(format!("{}/working-hours/me", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({"timezone": "UTC", "weekly": [], "overrides": []}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_booking_outside_hours() {
    let client = Client::new();
    let token = auth_token(&unique_sub());

    client
        .put(format!("{}/working-hours/me", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({"timezone": "UTC", "weekly": weekly([false, true, true, true, true, true, false])}))
        .send()
        .await
        .expect("Failed to send request");

    let response = client
        .post(format!("{}/working-hours/me/booking-check", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({"date": "2024-07-06", "start": "10:00", "end": "11:00"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    let response = client
        .post(format!("{}/working-hours/me/booking-check", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({"date": "2024-07-01", "start": "10:00", "end": "11:00"}))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}
