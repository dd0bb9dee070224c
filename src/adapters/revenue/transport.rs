//! HTTP transport for signed requests
//!
//! The transport receives fully prepared and signed descriptors and sends
//! them as-is. It never touches the signed headers, so a retried request is
//! byte-identical to the first attempt.

use crate::config::{RetryConfig, RevenueConfig};
use crate::core::signing::RequestDescriptor;
use crate::domain::errors::TransportError;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Method};
use std::time::Duration;
use url::Url;

/// A successful response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Decodes the body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }
}

/// Sends signed requests to the tax authority
#[async_trait]
pub trait Transport: Send + Sync {
    /// Value for the `host` header of requests sent through this transport
    fn host(&self) -> &str;

    /// Sends `request`; a non-success status is a [`TransportError::Status`]
    async fn send(&self, request: &RequestDescriptor) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport with retry for idempotent requests
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    host: String,
    retry: RetryConfig,
}

impl ReqwestTransport {
    /// Builds the HTTP client from the `[revenue]` section
    ///
    /// # Errors
    ///
    /// [`TransportError::InvalidRequest`] if the base URL has no host or the
    /// client cannot be built.
    pub fn new(config: &RevenueConfig) -> Result<Self, TransportError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| TransportError::InvalidRequest(format!("Invalid base_url: {}", e)))?;
        let host = match (base_url.host_str(), base_url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(TransportError::InvalidRequest(format!(
                    "base_url has no host: {}",
                    config.base_url
                )))
            }
        };

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            TransportError::InvalidRequest(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url,
            host,
            retry: config.retry.clone(),
        })
    }

    async fn send_once(
        &self,
        request: &RequestDescriptor,
    ) -> Result<TransportResponse, TransportError> {
        let url = self
            .base_url
            .join(request.path())
            .map_err(|e| TransportError::InvalidRequest(format!("Invalid path: {}", e)))?;
        let method = Method::from_bytes(request.method().as_bytes())
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let mut builder = self.client.request(method, url);
        for (name, value) in request.headers().iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }

        let resp = builder.send().await.map_err(map_reqwest_error)?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(TransportResponse {
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }

    fn backoff_delay(&self, attempt: usize) -> Duration {
        let delay_ms = self.retry.initial_delay_ms as f64
            * self.retry.backoff_multiplier.powi(attempt as i32 - 1);
        Duration::from_millis((delay_ms as u64).min(self.retry.max_delay_ms))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    fn host(&self) -> &str {
        &self.host
    }

    async fn send(&self, request: &RequestDescriptor) -> Result<TransportResponse, TransportError> {
        let mut attempt = 0;

        loop {
            match self.send_once(request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    attempt += 1;
                    if !request.is_idempotent()
                        || !e.is_retryable()
                        || attempt > self.retry.max_retries
                    {
                        return Err(e);
                    }

                    let delay = self.backoff_delay(attempt);
                    crate::log_retry_attempt!(
                        request.path(),
                        attempt,
                        self.retry.max_retries,
                        delay.as_millis() as u64,
                        &e
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> RevenueConfig {
        RevenueConfig {
            base_url: base_url.to_string(),
            api_path: "/paye-employers/v1/rest".to_string(),
            signature_algorithm: Default::default(),
            timeout_seconds: 5,
            tls_verify: true,
            retry: RetryConfig {
                max_retries: 3,
                initial_delay_ms: 100,
                max_delay_ms: 250,
                backoff_multiplier: 2.0,
            },
            active_certificate: 999963,
        }
    }

    #[test]
    fn test_host_includes_explicit_port() {
        let transport = ReqwestTransport::new(&config("http://127.0.0.1:8443")).unwrap();
        assert_eq!(transport.host(), "127.0.0.1:8443");

        let transport = ReqwestTransport::new(&config("https://softwaretest.ros.ie")).unwrap();
        assert_eq!(transport.host(), "softwaretest.ros.ie");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ReqwestTransport::new(&config("not a url")),
            Err(TransportError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_backoff_is_capped() {
        let transport = ReqwestTransport::new(&config("https://softwaretest.ros.ie")).unwrap();
        assert_eq!(transport.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(transport.backoff_delay(2), Duration::from_millis(200));
        assert_eq!(transport.backoff_delay(3), Duration::from_millis(250));
    }
}
