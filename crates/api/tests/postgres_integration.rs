//! Integration tests against a real PostgreSQL database.
//!
//! Ignored by default. Run with
//! `TEST_DATABASE_URL=postgres://... cargo test -p moi-sushi-api --test postgres_integration -- --ignored`.

mod common;

use std::time::Duration;

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use domain::models::email_setting::keys;
use domain::models::{FeedbackType, NewFeedback};
use domain::services::{EmailSettingStore, FeedbackStore};
use moi_sushi_api::app::create_app;
use persistence::{EmailSettingRepository, FeedbackRepository};

use common::{fresh_database, get_request, json_request, parse_response_body, test_config};

async fn stored_settings(pool: &sqlx::PgPool) -> Vec<(String, String)> {
    sqlx::query_as::<_, (String, String)>(
        "SELECT setting_key, setting_value FROM email_settings ORDER BY setting_key",
    )
    .fetch_all(pool)
    .await
    .unwrap()
}

fn new_feedback(message: &str) -> NewFeedback {
    NewFeedback {
        feedback_type: FeedbackType::Feedback,
        name: Some("Aino".to_string()),
        email: None,
        message: message.to_string(),
        status: "new".to_string(),
        user_agent: None,
        ip_address: Some("203.0.113.9".to_string()),
    }
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_set_sendgrid_key_twice_keeps_one_row_per_key() {
    let (_guard, pool) = fresh_database().await;
    let request = || {
        json_request(
            Method::POST,
            "/api/admin/set-sendgrid-key",
            json!({ "apiKey": "SG.repeat-me", "fromName": "Moi Sushi" }),
        )
    };

    let app = create_app(test_config(), pool.clone());
    let response = app.oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = stored_settings(&pool).await;

    let app = create_app(test_config(), pool.clone());
    let response = app.oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let second = stored_settings(&pool).await;

    assert_eq!(first, second);
    assert_eq!(
        second,
        vec![
            (keys::EMAIL_PROVIDER.to_string(), "sendgrid".to_string()),
            (keys::SENDGRID_API_KEY.to_string(), "SG.repeat-me".to_string()),
            (keys::SENDGRID_FROM_NAME.to_string(), "Moi Sushi".to_string()),
        ]
    );
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_email_settings_update_overwrites_in_place() {
    let (_guard, pool) = fresh_database().await;
    let repo = EmailSettingRepository::new(pool.clone());
    repo.upsert(keys::ADMIN_EMAIL, "vanha@moisushi.fi").await.unwrap();

    let app = create_app(test_config(), pool.clone());
    let response = app
        .oneshot(json_request(
            Method::PUT,
            "/api/admin/email-settings",
            json!({ "provider": "smtp", "adminEmail": "omistaja@moisushi.fi" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let settings = repo.list().await.unwrap();
    assert_eq!(settings.len(), 2);
    let admin = settings
        .iter()
        .find(|s| s.setting_key == keys::ADMIN_EMAIL)
        .unwrap();
    assert_eq!(admin.setting_value, "omistaja@moisushi.fi");
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_feedback_listed_newest_first() {
    let (_guard, pool) = fresh_database().await;
    let repo = FeedbackRepository::new(pool.clone());

    for message in ["ensimmäinen", "toinen", "kolmas"] {
        repo.create(new_feedback(message)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let recent = repo.list_recent(2).await.unwrap();
    let messages: Vec<&str> = recent.iter().map(|f| f.message.as_str()).collect();
    assert_eq!(messages, vec!["kolmas", "toinen"]);
    assert_eq!(recent[0].status, "new");
    assert_eq!(recent[0].ip_address.as_deref(), Some("203.0.113.9"));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_feedback_round_trips_through_api() {
    let (_guard, pool) = fresh_database().await;

    let app = create_app(test_config(), pool.clone());
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/feedback",
            json!({ "type": "bug", "email": "aino@example.fi", "message": "  Sivu ei lataudu  " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = parse_response_body(response).await;

    let app = create_app(test_config(), pool.clone());
    let response = app
        .oneshot(get_request("/api/admin/feedback"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["feedback"][0]["id"], created["id"]);
    assert_eq!(body["feedback"][0]["type"], "bug");
    assert_eq!(body["feedback"][0]["message"], "Sivu ei lataudu");
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_readiness_reports_database_up() {
    let (_guard, pool) = fresh_database().await;

    let app = create_app(test_config(), pool);
    let response = app.oneshot(get_request("/api/health/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
