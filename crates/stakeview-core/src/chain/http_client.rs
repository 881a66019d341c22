use reqwest::{Client, ClientBuilder, Method, StatusCode};
use std::{sync::Arc, time::Duration};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::chain::ChainError;

const MAX_RETRIES: u32 = 2;
const MAX_ERROR_BODY: usize = 256;

/// Configuration for HTTP client concurrency and timeout behavior.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum number of concurrent HTTP requests allowed
    pub concurrent_limit: usize,
    /// Permit acquisition timeout in milliseconds
    pub permit_timeout_ms: u64,
    /// Whole-request timeout
    pub request_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self { concurrent_limit: 256, permit_timeout_ms: 2_000, request_timeout: Duration::from_secs(30) }
    }
}

/// HTTP client with semaphore-based concurrency control.
///
/// Shared by the gateway query client and the account API client. Server errors and
/// transport failures are retried with exponential backoff before surfacing.
pub struct HttpClient {
    client: Client,
    concurrent_limit: Arc<Semaphore>,
    config: HttpClientConfig,
}

/// RAII guard ensuring semaphore permits are always released.
struct PermitGuard {
    _permit: OwnedSemaphorePermit,
    semaphore: Arc<Semaphore>,
}

impl Drop for PermitGuard {
    fn drop(&mut self) {
        tracing::trace!(
            available_permits = self.semaphore.available_permits(),
            "permit guard dropped"
        );
    }
}

impl HttpClient {
    /// Creates a new HTTP client with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn with_config(config: HttpClientConfig) -> Result<Self, ChainError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(32)
            .connect_timeout(Duration::from_secs(5))
            .timeout(config.request_timeout)
            .use_rustls_tls()
            .user_agent(concat!("stakeview/", env!("CARGO_PKG_VERSION")))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                ChainError::ConnectionFailed(format!("HTTP client build failed: {e}"))
            })?;

        Ok(Self {
            client,
            concurrent_limit: Arc::new(Semaphore::new(config.concurrent_limit)),
            config,
        })
    }

    /// Sanitizes network errors to avoid echoing URLs or credentials into logs and responses.
    fn sanitize_network_error(error: &reqwest::Error) -> String {
        if error.is_connect() {
            "connection refused or unreachable".to_string()
        } else if error.is_timeout() {
            "connection timed out".to_string()
        } else if error.is_body() {
            "response body error".to_string()
        } else if error.is_decode() {
            "response decode error".to_string()
        } else {
            "network error".to_string()
        }
    }

    /// Sends a JSON `POST` and returns the response body.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::send`].
    pub async fn post_json(&self, url: &str, body: bytes::Bytes) -> Result<bytes::Bytes, ChainError> {
        self.send(Method::POST, url, Some(body)).await
    }

    /// Sends a `GET` and returns the response body.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::send`].
    pub async fn get(&self, url: &str) -> Result<bytes::Bytes, ChainError> {
        self.send(Method::GET, url, None).await
    }

    /// Sends a request with semaphore-based concurrency control.
    ///
    /// # Errors
    ///
    /// - [`ChainError::Timeout`] if permit acquisition or the request times out
    /// - [`ChainError::ConcurrencyLimit`] if the semaphore is closed
    /// - [`ChainError::HttpError`] for non-success HTTP status codes
    /// - [`ChainError::ConnectionFailed`] for other transport failures
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<bytes::Bytes>,
    ) -> Result<bytes::Bytes, ChainError> {
        let permit = tokio::time::timeout(
            Duration::from_millis(self.config.permit_timeout_ms),
            Arc::clone(&self.concurrent_limit).acquire_owned(),
        )
        .await
        .map_err(|_| {
            tracing::warn!(
                url = url,
                available_permits = self.concurrent_limit.available_permits(),
                "http client semaphore acquisition timeout"
            );
            ChainError::Timeout
        })?
        .map_err(|_| ChainError::ConcurrencyLimit(url.to_string()))?;

        let _permit_guard = PermitGuard { _permit: permit, semaphore: self.concurrent_limit.clone() };

        let mut retries = 0;
        loop {
            let mut request = self.client.request(method.clone(), url);
            if let Some(body) = &body {
                // Bytes::clone is a refcount bump, so retries do not copy the payload
                request = request.header("content-type", "application/json").body(body.clone());
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.bytes().await.map_err(ChainError::Network);
                    }
                    if status.is_server_error() && retries < MAX_RETRIES {
                        retries += 1;
                        tokio::time::sleep(Duration::from_millis(100 * (1 << retries))).await;
                        continue;
                    }
                    return Err(Self::status_error(status, response.text().await.unwrap_or_default()));
                }
                Err(_) if retries < MAX_RETRIES => {
                    retries += 1;
                    tokio::time::sleep(Duration::from_millis(100 * (1 << retries))).await;
                }
                Err(e) => {
                    if e.is_timeout() {
                        return Err(ChainError::Timeout);
                    }
                    return Err(ChainError::ConnectionFailed(Self::sanitize_network_error(&e)));
                }
            }
        }
    }

    fn status_error(status: StatusCode, raw_text: String) -> ChainError {
        let text = if raw_text.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !raw_text.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}... (truncated)", &raw_text[..cut])
        } else {
            raw_text
        };
        tracing::trace!(status = status.as_u16(), "http request failed");
        ChainError::HttpError(status.as_u16(), text)
    }

    #[cfg(test)]
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.concurrent_limit.available_permits()
    }
}
