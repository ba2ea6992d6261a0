//! Receipt printer routes.

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use domain::models::printer::{TcpPrintRequest, TcpPrintResponse};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::JsonBody;
use crate::services::{PrinterClient, TcpPrinter};

const DEFAULT_EPOS_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// POST /api/printer
///
/// Forwards an ePOS-Print SOAP envelope to the LAN printer and relays the
/// printer's status and body unchanged.
pub async fn print_epos(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let printer = state
        .epos_printer
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("ePOS printer is not configured".to_string()))?;

    let receipt = printer.print(&body).await?;

    let status = StatusCode::from_u16(receipt.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = receipt
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_EPOS_CONTENT_TYPE));

    Ok((status, [(header::CONTENT_TYPE, content_type)], receipt.body).into_response())
}

/// POST /api/printer/tcp
///
/// Sends receipt bytes to a raw TCP printer. Every field is checked before
/// a socket is opened.
pub async fn print_tcp(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<TcpPrintRequest>,
) -> Result<Json<TcpPrintResponse>, ApiError> {
    let job = request.into_job()?;
    let printer = TcpPrinter::from_job(
        &job,
        Duration::from_millis(state.config.printer.tcp_timeout_ms),
    );

    let receipt = printer.print(&job.data).await?;

    info!(
        printer = %printer.addr(),
        bytes_sent = receipt.bytes_sent,
        "Receipt printed"
    );

    Ok(Json(TcpPrintResponse {
        success: true,
        message: format!("Tulostettu: {} tavua lähetetty", receipt.bytes_sent),
        bytes_sent: receipt.bytes_sent,
    }))
}
