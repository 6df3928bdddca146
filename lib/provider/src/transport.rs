//! Injected HTTP capability for provider calls.
//!
//! The client never talks to the network directly; it goes through the
//! `ApiTransport` trait. The contract: given a URL and headers, return
//! a status and body or fail with a transport error within a bounded
//! timeout. Production uses a reqwest-backed implementation; tests
//! substitute canned responses.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// A raw HTTP response from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl ApiResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors raised before an HTTP response exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request exceeded the configured timeout.
    Timeout,
    /// Connection or protocol failure.
    Network { reason: String },
    /// The request could not be constructed.
    InvalidRequest { reason: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "request timed out"),
            Self::Network { reason } => write!(f, "network error: {reason}"),
            Self::InvalidRequest { reason } => write!(f, "invalid request: {reason}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// HTTP GET capability injected into the provider client.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Issues a GET request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no HTTP response was obtained;
    /// non-2xx statuses are NOT transport errors and come back as
    /// ordinary [`ApiResponse`] values for the caller to interpret.
    async fn get(&self, url: &str, headers: &[(&str, String)])
    -> Result<ApiResponse, TransportError>;
}

/// reqwest-backed transport with a finite request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] if the underlying
    /// client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::InvalidRequest {
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, String)],
    ) -> Result<ApiResponse, TransportError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Network {
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Network {
                    reason: e.to_string(),
                }
            }
        })?;

        Ok(ApiResponse { status, body })
    }
}
