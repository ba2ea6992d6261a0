use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use domain::models::email::TemplateError;
use domain::models::notification::NotifyRequestError;
use domain::models::printer::TcpPrintRequestError;
use domain::services::StoreError;

use crate::services::{EmailError, NotifyError, PrintError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Field-level validation failures.
    #[error("Validation error: {message}")]
    InvalidInput {
        message: String,
        fields: Vec<ValidationDetail>,
    },

    #[error("Rate limited")]
    RateLimited { retry_after: u64 },

    /// An integration (email, printer, relay) failed. The message is shown
    /// to the client as-is.
    #[error("{service} error: {message}")]
    Upstream {
        service: &'static str,
        message: String,
        details: Option<Value>,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut retry_after = None;

        let (status, error_code, message, details) = match self {
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized".to_string(), msg, None)
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found".to_string(), msg, None),
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error".to_string(),
                msg,
                None,
            ),
            ApiError::InvalidInput { message, fields } => (
                StatusCode::BAD_REQUEST,
                "validation_error".to_string(),
                message,
                Some(json!(fields)),
            ),
            ApiError::RateLimited { retry_after: secs } => {
                retry_after = Some(secs);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "rate_limited".to_string(),
                    "Too many requests. Please try again later.".to_string(),
                    Some(json!({ "retryAfter": secs })),
                )
            }
            ApiError::Upstream {
                service,
                message,
                details,
            } => {
                tracing::warn!(service = service, error = %message, "Upstream call failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("{}_error", service),
                    message,
                    details,
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error".to_string(),
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable".to_string(),
                msg,
                None,
            ),
        };

        let body = ErrorBody {
            error: error_code,
            message,
            details,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

/// `customer_email` to `customerEmail`, matching the JSON field names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn collect_details(prefix: &str, errors: &ValidationErrors, out: &mut Vec<ValidationDetail>) {
    for (field, kind) in errors.errors() {
        let name = if *field == "__all__" {
            prefix.to_string()
        } else if prefix.is_empty() {
            camel_case(field)
        } else {
            format!("{}.{}", prefix, camel_case(field))
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| ValidationDetail {
                    field: name.clone(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", name)),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_details(&name, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_details(&format!("{}[{}]", name, index), inner, out);
                }
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details = Vec::new();
        collect_details("", &errors, &mut details);
        details.sort_by(|a, b| a.field.cmp(&b.field));

        let message = if details.len() == 1 {
            details[0].message.clone()
        } else {
            format!("{} validation errors", details.len())
        };

        ApiError::InvalidInput {
            message,
            fields: details,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(msg) => ApiError::Internal(msg),
            StoreError::Unavailable(msg) => ApiError::ServiceUnavailable(msg),
        }
    }
}

impl From<EmailError> for ApiError {
    fn from(err: EmailError) -> Self {
        match &err {
            EmailError::InvalidAddress(_) | EmailError::TemplateError(_) => {
                ApiError::Validation(err.to_string())
            }
            EmailError::SettingsUnavailable(msg) => ApiError::ServiceUnavailable(msg.clone()),
            EmailError::ProviderError {
                provider,
                status,
                body,
            } => {
                let body: Value = serde_json::from_str(body).unwrap_or_else(|_| json!(body));
                ApiError::Upstream {
                    service: "email",
                    message: err.to_string(),
                    details: Some(json!({
                        "provider": provider,
                        "status": status,
                        "body": body
                    })),
                }
            }
            EmailError::NotConfigured(_) | EmailError::SendFailed(_) => ApiError::Upstream {
                service: "email",
                message: err.to_string(),
                details: None,
            },
        }
    }
}

impl From<TemplateError> for ApiError {
    fn from(err: TemplateError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<PrintError> for ApiError {
    fn from(err: PrintError) -> Self {
        let message = match &err {
            PrintError::Connection(_) => "Tulostimeen ei saatu yhteyttä",
            PrintError::Io(_) => "Tulostustyön lähettäminen epäonnistui",
            PrintError::Timeout(_) => "Tulostin ei vastannut ajoissa",
            PrintError::InvalidConfig(_) => return ApiError::Internal(err.to_string()),
        };
        ApiError::Upstream {
            service: "printer",
            message: message.to_string(),
            details: Some(json!({ "reason": err.to_string() })),
        }
    }
}

impl From<NotifyError> for ApiError {
    fn from(err: NotifyError) -> Self {
        let details = match &err {
            NotifyError::Connection(_) => None,
            NotifyError::Rejected { status, body } => Some(json!({
                "status": status,
                "body": body
            })),
        };
        ApiError::Upstream {
            service: "websocket",
            message: err.to_string(),
            details,
        }
    }
}

impl From<TcpPrintRequestError> for ApiError {
    fn from(err: TcpPrintRequestError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<NotifyRequestError> for ApiError {
    fn from(err: NotifyRequestError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use domain::models::EmailProvider;
    use validator::Validate;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_api_error_status_codes() {
        let cases = vec![
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::RateLimited { retry_after: 5 }, StatusCode::TOO_MANY_REQUESTS),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_message() {
        let response = ApiError::Internal("connection refused at 10.0.0.5".into()).into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "An internal error occurred");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited { retry_after: 42 }.into_response();
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "42");
        let body = body_json(response).await;
        assert_eq!(body["error"], "rate_limited");
    }

    #[tokio::test]
    async fn test_provider_error_carries_details() {
        let err = EmailError::ProviderError {
            provider: EmailProvider::SendGrid,
            status: 401,
            body: r#"{"errors":[{"message":"bad key"}]}"#.to_string(),
        };
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "email_error");
        assert_eq!(body["details"]["status"], 401);
        assert_eq!(body["details"]["provider"], "sendgrid");
        assert_eq!(body["details"]["body"]["errors"][0]["message"], "bad key");
    }

    #[tokio::test]
    async fn test_print_timeout_is_localized() {
        let response = ApiError::from(PrintError::Timeout("10.0.0.9:9100".into())).into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"], "printer_error");
        assert_eq!(body["message"], "Tulostin ei vastannut ajoissa");
    }

    #[test]
    fn test_store_unavailable_maps_to_503() {
        let error: ApiError = StoreError::Unavailable("pool timed out".into()).into();
        assert_eq!(error.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "customerName is required"))]
        customer_name: String,
    }

    #[tokio::test]
    async fn test_validation_errors_use_json_field_names() {
        let errors = Sample {
            customer_name: String::new(),
        }
        .validate()
        .unwrap_err();

        let response = ApiError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["message"], "customerName is required");
        assert_eq!(body["details"][0]["field"], "customerName");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("customer_email"), "customerEmail");
        assert_eq!(camel_case("to"), "to");
        assert_eq!(camel_case("_private"), "private");
    }
}
