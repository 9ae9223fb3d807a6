use super::envelope::{execute_envelope, SOAP_ACTION};
use crate::config::XmlaConfig;
use crate::mdx::MdxStatement;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Status(u16),
    Network,
    Timeout,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::Status(code) => write!(f, "HTTP {}", code),
            TransportErrorKind::Network => write!(f, "network error"),
            TransportErrorKind::Timeout => write!(f, "timeout"),
        }
    }
}

#[derive(Error, Debug)]
#[error("XMLA transport failed ({kind}): {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    /// Response body for [`TransportErrorKind::Status`] failures.
    pub body: Option<String>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        TransportError {
            kind,
            message: message.into(),
            body: None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportErrorKind::Timeout
        } else {
            TransportErrorKind::Network
        };
        TransportError::new(kind, e.to_string())
    }
}

/// Executes one MDX statement against the OLAP server and returns the raw
/// XML body. One call per query, no retries.
#[async_trait]
pub trait XmlaTransport: Send + Sync {
    async fn execute(&self, statement: &MdxStatement) -> Result<String, TransportError>;
}

/// SOAP-over-HTTP client. Built once per process; clones share the
/// connection pool.
#[derive(Clone)]
pub struct HttpXmlaClient {
    client: Client,
    endpoint: String,
    catalog: String,
}

impl HttpXmlaClient {
    pub fn new(
        endpoint: impl Into<String>,
        catalog: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpXmlaClient {
            client,
            endpoint: endpoint.into(),
            catalog: catalog.into(),
        })
    }

    pub fn from_config(config: &XmlaConfig) -> Result<Self, TransportError> {
        Self::new(config.url.clone(), config.catalog.clone(), config.timeout())
    }
}

#[async_trait]
impl XmlaTransport for HttpXmlaClient {
    async fn execute(&self, statement: &MdxStatement) -> Result<String, TransportError> {
        debug!("Sending MDX to {} (catalog {})", self.endpoint, self.catalog);

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/xml")
            .header("SOAPAction", SOAP_ACTION)
            .body(execute_envelope(statement, &self.catalog))
            .send()
            .await
            .map_err(|e| {
                error!("XMLA request to {} failed: {}", self.endpoint, e);
                TransportError::from(e)
            })?;

        let status = response.status();
        let body = response.text().await?;
        debug!("XMLA response: status={}, {} bytes", status, body.len());

        if !status.is_success() {
            return Err(TransportError {
                kind: TransportErrorKind::Status(status.as_u16()),
                message: format!("OLAP server responded with {}", status),
                body: Some(body),
            });
        }
        Ok(body)
    }
}
