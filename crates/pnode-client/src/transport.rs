//! Transport gateway: one GET against the telemetry API.
//!
//! The cache and API layers only see the [`Transport`] trait. [`HttpTransport`]
//! is the default adapter over `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use pnode_shared::{TransportError, TransportErrorKind};

/// Performs a single request and returns the parsed JSON payload.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, TransportError>;
}

/// `reqwest`-backed transport rooted at a base URL.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::new(TransportErrorKind::Other, e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, params = params.len(), "GET");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::new(
                TransportErrorKind::Status(status.as_u16()),
                format!("{status} from {path}: {}", body.trim()),
            ));
        }

        response.json::<Value>().await.map_err(classify)
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    let kind = if e.is_timeout() {
        TransportErrorKind::Timeout
    } else if e.is_connect() {
        TransportErrorKind::Unreachable
    } else if let Some(status) = e.status() {
        TransportErrorKind::Status(status.as_u16())
    } else {
        TransportErrorKind::Other
    };
    TransportError::new(kind, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let transport = HttpTransport::new("http://127.0.0.1:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(transport.base_url(), "http://127.0.0.1:8000");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Port 9 (discard) on loopback is closed on test machines.
        let transport = HttpTransport::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = transport.get("/health", &[]).await.unwrap_err();
        assert!(matches!(
            err.kind,
            TransportErrorKind::Unreachable | TransportErrorKind::Timeout | TransportErrorKind::Other
        ));
    }
}
