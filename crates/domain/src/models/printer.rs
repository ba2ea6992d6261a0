//! Receipt printer request models.

use serde::{Deserialize, Serialize};

/// A TCP port given either as a JSON number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(u64),
    Text(String),
}

impl PortValue {
    /// Returns the port if it is a non-zero value in range.
    pub fn as_port(&self) -> Option<u16> {
        let value = match self {
            PortValue::Number(n) => *n,
            PortValue::Text(s) => s.trim().parse::<u64>().ok()?,
        };
        u16::try_from(value).ok().filter(|p| *p != 0)
    }
}

/// Request payload for raw TCP printing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcpPrintRequest {
    #[serde(rename = "printerIP")]
    pub printer_ip: Option<String>,
    pub port: Option<PortValue>,
    pub receipt_data: Option<String>,
}

/// A validated TCP print job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpPrintJob {
    pub host: String,
    pub port: u16,
    pub data: Vec<u8>,
}

/// Why a TCP print request was rejected before connecting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TcpPrintRequestError {
    #[error("printerIP, port and receiptData are required")]
    MissingFields,

    #[error("Invalid port: must be between 1 and 65535")]
    InvalidPort,
}

impl TcpPrintRequest {
    /// Checks that every field is present and non-empty.
    pub fn into_job(self) -> Result<TcpPrintJob, TcpPrintRequestError> {
        let host = self
            .printer_ip
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());
        let data = self.receipt_data.filter(|d| !d.is_empty());

        let (host, port, data) = match (host, self.port, data) {
            (Some(host), Some(port), Some(data)) => (host, port, data),
            _ => return Err(TcpPrintRequestError::MissingFields),
        };

        // A zero port is as good as no port at all.
        let port = match port.as_port() {
            Some(port) => port,
            None if port == PortValue::Number(0) => {
                return Err(TcpPrintRequestError::MissingFields)
            }
            None => return Err(TcpPrintRequestError::InvalidPort),
        };

        Ok(TcpPrintJob {
            host,
            port,
            data: data.into_bytes(),
        })
    }
}

/// Response for a completed TCP print job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TcpPrintResponse {
    pub success: bool,
    pub message: String,
    pub bytes_sent: usize,
}
