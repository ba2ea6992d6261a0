//! Receipt printer adapters.
//!
//! Supports:
//! - Epson ePOS-Print over HTTP (SOAP envelope forwarded as-is)
//! - Raw TCP printers (ESC/POS bytes, usually port 9100)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, instrument, warn};

use domain::models::TcpPrintJob;

use crate::middleware::metrics::record_print_job;

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// What the printer answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintReceipt {
    /// HTTP status from an ePOS endpoint; 200 for raw TCP.
    pub status: u16,
    pub body: String,
    pub content_type: Option<String>,
    pub bytes_sent: usize,
}

#[async_trait]
pub trait PrinterClient: Send + Sync {
    /// Short label for logs and metrics.
    fn kind(&self) -> &'static str;

    async fn print(&self, data: &[u8]) -> Result<PrintReceipt, PrintError>;
}

/// Epson ePOS-Print endpoint.
///
/// The request body is forwarded untouched and the printer's response is
/// handed back without interpretation.
#[derive(Debug, Clone)]
pub struct EposHttpPrinter {
    client: reqwest::Client,
    url: String,
}

impl EposHttpPrinter {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Result<Self, PrintError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(PrintError::InvalidConfig("ePOS printer URL is empty".to_string()));
        }
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PrinterClient for EposHttpPrinter {
    fn kind(&self) -> &'static str {
        "epos"
    }

    #[instrument(skip(self, data), fields(url = %self.url, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> Result<PrintReceipt, PrintError> {
        let result = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, HeaderValue::from_static("text/xml; charset=utf-8"))
            .header("SOAPAction", HeaderValue::from_static("\"\""))
            .body(data.to_vec())
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "ePOS printer unreachable");
                record_print_job(self.kind(), false);
                return Err(PrintError::Connection(e.to_string()));
            }
        };

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| PrintError::Connection(format!("Reading printer response failed: {}", e)))?;

        info!(status = status, "ePOS printer responded");
        record_print_job(self.kind(), response_ok(status));

        Ok(PrintReceipt {
            status,
            body,
            content_type,
            bytes_sent: data.len(),
        })
    }
}

fn response_ok(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Network printer reached over raw TCP.
///
/// One connection per job. Connect, write and shutdown share a single
/// deadline; when it expires the in-flight future is dropped, which closes
/// the socket.
#[derive(Debug, Clone)]
pub struct TcpPrinter {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpPrinter {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    pub fn from_job(job: &TcpPrintJob, timeout: Duration) -> Self {
        Self::new(job.host.clone(), job.port, timeout)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    async fn send_all(&self, data: &[u8]) -> Result<(), PrintError> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| PrintError::Connection(format!("{}: {}", self.addr(), e)))?;

        stream.write_all(data).await.map_err(|e| {
            PrintError::Io(std::io::Error::new(
                e.kind(),
                format!("Write failed: {}", e),
            ))
        })?;
        stream.shutdown().await?;
        Ok(())
    }
}

#[async_trait]
impl PrinterClient for TcpPrinter {
    fn kind(&self) -> &'static str {
        "tcp"
    }

    #[instrument(skip(self, data), fields(addr = %self.addr(), data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> Result<PrintReceipt, PrintError> {
        info!("Sending print job");

        let result = match tokio::time::timeout(self.timeout, self.send_all(data)).await {
            Ok(inner) => inner,
            Err(_) => Err(PrintError::Timeout(format!(
                "{} did not complete within {} ms",
                self.addr(),
                self.timeout.as_millis()
            ))),
        };
        record_print_job(self.kind(), result.is_ok());

        match result {
            Ok(()) => {
                info!("Print job sent successfully");
                Ok(PrintReceipt {
                    status: 200,
                    body: String::new(),
                    content_type: None,
                    bytes_sent: data.len(),
                })
            }
            Err(e) => {
                warn!(error = %e, "Print job failed");
                Err(e)
            }
        }
    }
}
