//! Admin key middleware.
//!
//! Operator endpoints (settings, raw email sends, feedback listing) require
//! the `X-Admin-Key` header when `security.admin_api_key` is configured.
//! With no key configured they are open, which suits local development.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::error::ApiError;

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

/// Middleware for admin-only routes.
pub async fn require_admin_key(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let expected = state.config.security.admin_api_key.trim();
    if expected.is_empty() {
        return next.run(req).await;
    }

    let provided = req
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| constant_time_eq(v.trim().as_bytes(), expected.as_bytes()));

    match provided {
        Some(true) => next.run(req).await,
        Some(false) => {
            tracing::warn!(path = %req.uri().path(), "Rejected request with wrong admin key");
            ApiError::Unauthorized("Invalid admin key".to_string()).into_response()
        }
        None => ApiError::Unauthorized(format!("Missing {} header", ADMIN_KEY_HEADER))
            .into_response(),
    }
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
