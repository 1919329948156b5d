//! Shared HTTP client infrastructure for HTTP-based generation backends
//!
//! One `reqwest::Client` per backend, with timeout and retry policies for
//! talking to model providers.

use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use learnsphere_utils::error::GenerationError;
use learnsphere_utils::redaction::redact_secrets;

/// Default maximum HTTP timeout (10 minutes)
const DEFAULT_MAX_HTTP_TIMEOUT: Duration = Duration::from_secs(600);

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of retry attempts for 5xx and network failures
const MAX_RETRIES: u32 = 2;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Upper bound on provider error text carried into an error message
const MAX_ERROR_DETAIL_CHARS: usize = 300;

#[derive(Clone)]
pub(crate) struct HttpClient {
    client: Arc<Client>,
    max_timeout: Duration,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns `GenerationError::Misconfiguration` if the client cannot be constructed
    pub fn new() -> Result<Self, GenerationError> {
        Self::with_max_timeout(DEFAULT_MAX_HTTP_TIMEOUT)
    }

    /// # Errors
    ///
    /// Returns `GenerationError::Misconfiguration` if the client cannot be constructed
    pub fn with_max_timeout(max_timeout: Duration) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| {
                GenerationError::Misconfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client: Arc::new(client),
            max_timeout,
        })
    }

    /// Start a POST request on the shared connection pool
    pub fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.post(url)
    }

    /// Execute an HTTP request with timeout and retry policy
    ///
    /// - Per-request timeout: `min(request_timeout, max_timeout)`
    /// - Up to 2 retries for 5xx and network failures, backing off 1s then 2s
    /// - No retries for 4xx errors
    ///
    /// # Errors
    ///
    /// - `ProviderAuth` for 401/403
    /// - `ProviderQuota` for 429
    /// - `ProviderOutage` for 5xx after retries
    /// - `Timeout` when the request times out
    /// - `Transport` for other 4xx and for network errors after retries
    pub async fn execute_with_retry(
        &self,
        request_builder: reqwest::RequestBuilder,
        request_timeout: Duration,
        provider_name: &str,
    ) -> Result<Response, GenerationError> {
        let effective_timeout = request_timeout.min(self.max_timeout);

        let mut attempt = 0;

        loop {
            attempt += 1;

            let request = request_builder
                .try_clone()
                .ok_or_else(|| {
                    GenerationError::Transport("Failed to clone request for retry".to_string())
                })?
                .timeout(effective_timeout)
                .build()
                .map_err(|e| {
                    GenerationError::Transport(redact_secrets(&format!(
                        "Failed to build request: {e}"
                    )))
                })?;

            debug!(
                provider = provider_name,
                attempt = attempt,
                timeout_secs = effective_timeout.as_secs(),
                "Executing HTTP request"
            );

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_client_error() {
                        let detail = response
                            .text()
                            .await
                            .ok()
                            .and_then(|body| provider_error_detail(&body));
                        return Err(map_client_error(status, provider_name, detail.as_deref()));
                    }

                    if status.is_server_error() {
                        if attempt <= MAX_RETRIES {
                            warn!(
                                provider = provider_name,
                                attempt = attempt,
                                status = status.as_u16(),
                                "Server error, will retry"
                            );
                            tokio::time::sleep(INITIAL_BACKOFF * attempt).await;
                            continue;
                        }

                        return Err(GenerationError::ProviderOutage(format!(
                            "{provider_name} returned server error: {status}"
                        )));
                    }

                    return Ok(response);
                }
                Err(e) => {
                    if e.is_timeout() {
                        return Err(GenerationError::Timeout {
                            duration: effective_timeout,
                        });
                    }

                    let message = redact_secrets(&e.to_string());

                    if attempt <= MAX_RETRIES {
                        warn!(
                            provider = provider_name,
                            attempt = attempt,
                            error = %message,
                            "Network error, will retry"
                        );
                        tokio::time::sleep(INITIAL_BACKOFF * attempt).await;
                        continue;
                    }

                    return Err(GenerationError::Transport(format!(
                        "{provider_name} request failed: {message}"
                    )));
                }
            }
        }
    }
}

/// Pull a human-readable message out of a provider error body.
///
/// Google APIs answer errors with `{"error": {"message": "..."}}`.
fn provider_error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value.get("error")?.get("message")?.as_str()?;
    let message: String = message.chars().take(MAX_ERROR_DETAIL_CHARS).collect();
    Some(redact_secrets(&message))
}

/// Map 4xx status codes to `GenerationError` variants
///
/// - 401/403 → `ProviderAuth`
/// - 429 → `ProviderQuota`
/// - Other 4xx → `Transport`
fn map_client_error(status: StatusCode, provider_name: &str, detail: Option<&str>) -> GenerationError {
    let suffix = detail.map(|d| format!(" ({d})")).unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::ProviderAuth(
            format!("{provider_name} authentication failed: {status}{suffix}"),
        ),
        StatusCode::TOO_MANY_REQUESTS => GenerationError::ProviderQuota(format!(
            "{provider_name} rate limit exceeded: {status}{suffix}"
        )),
        _ => GenerationError::Transport(format!(
            "{provider_name} returned client error: {status}{suffix}"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_construction() {
        assert!(HttpClient::new().is_ok());
    }

    #[test]
    fn test_http_client_with_custom_timeout() {
        let custom_timeout = Duration::from_secs(60);
        let client = HttpClient::with_max_timeout(custom_timeout).unwrap();
        assert_eq!(client.max_timeout, custom_timeout);
    }

    #[test]
    fn test_map_401_and_403_to_provider_auth() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            match map_client_error(status, "gemini", None) {
                GenerationError::ProviderAuth(msg) => {
                    assert!(msg.contains("gemini"));
                    assert!(msg.contains(status.as_str()));
                    assert!(msg.contains("authentication failed"));
                }
                other => panic!("Expected ProviderAuth for {status}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_map_429_to_provider_quota() {
        match map_client_error(StatusCode::TOO_MANY_REQUESTS, "gemini", None) {
            GenerationError::ProviderQuota(msg) => {
                assert!(msg.contains("429"));
                assert!(msg.contains("rate limit"));
            }
            other => panic!("Expected ProviderQuota for 429, got {other:?}"),
        }
    }

    #[test]
    fn test_map_other_4xx_to_transport_with_detail() {
        let error = map_client_error(
            StatusCode::BAD_REQUEST,
            "gemini",
            Some("API key not valid. Please pass a valid API key."),
        );
        match error {
            GenerationError::Transport(msg) => {
                assert!(msg.contains("400"));
                assert!(msg.contains("client error"));
                assert!(msg.contains("API key not valid"));
            }
            other => panic!("Expected Transport for 400, got {other:?}"),
        }
    }

    #[test]
    fn test_provider_error_detail_extraction() {
        let body = r#"{"error": {"code": 400, "message": "Request contains an invalid argument.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(
            provider_error_detail(body).as_deref(),
            Some("Request contains an invalid argument.")
        );
        assert_eq!(provider_error_detail("<html>bad gateway</html>"), None);
        assert_eq!(provider_error_detail(r#"{"error": "flat"}"#), None);
    }

    #[test]
    fn test_provider_error_detail_is_redacted_and_capped() {
        let key = format!("AIza{}", "k".repeat(35));
        let body = format!(
            r#"{{"error": {{"message": "bad key {key} {}"}}}}"#,
            "x ".repeat(400)
        );
        let detail = provider_error_detail(&body).unwrap();
        assert!(!detail.contains(&key));
        assert!(detail.chars().count() <= MAX_ERROR_DETAIL_CHARS + 20);
    }
}
