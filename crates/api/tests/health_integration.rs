//! Integration tests for health, metrics and cross-cutting middleware.

mod common;

use axum::http::{header, StatusCode};

use common::{get_request, parse_response_body, test_config, TestApp};

#[tokio::test]
async fn test_health_check_reports_database() {
    let app = TestApp::new(test_config());

    let response = app.request(get_request("/api/health")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["database"]["connected"], true);
}

#[tokio::test]
async fn test_liveness_and_readiness() {
    let app = TestApp::new(test_config());

    let response = app.request(get_request("/api/health/live")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await["status"], "alive");

    let response = app.request(get_request("/api/health/ready")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await["status"], "ready");
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let app = TestApp::new(test_config());

    let response = app.request(get_request("/api/health/live")).await;

    let headers = response.headers();
    assert!(headers.contains_key("x-request-id"));
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let app = TestApp::new(test_config());

    let response = app.request(get_request("/api/menu")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_metrics_endpoint_answers() {
    let app = TestApp::new(test_config());

    let response = app.request(get_request("/metrics")).await;

    // 503 until the recorder is installed by the binary.
    assert!(
        response.status() == StatusCode::OK
            || response.status() == StatusCode::SERVICE_UNAVAILABLE
    );
}
