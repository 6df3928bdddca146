//! Server-level error types.

use crate::auth::oauth::OAuthError;
use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use guildgate_platform_access::ConfigurationError;
use guildgate_provider::{FilterError, TransportError};
use std::fmt;

/// Errors that abort startup.
#[derive(Debug)]
pub enum StartupError {
    /// Token secret, lifetime, or redirect allow-list is invalid.
    Configuration(ConfigurationError),
    /// OAuth client registration is invalid.
    OAuth(OAuthError),
    /// The HTTP client could not be constructed.
    Transport(TransportError),
    /// No bot token was configured.
    MissingBotToken,
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(err) => write!(f, "invalid configuration: {err}"),
            Self::OAuth(err) => write!(f, "invalid OAuth registration: {err}"),
            Self::Transport(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::MissingBotToken => write!(f, "no bot token configured"),
        }
    }
}

impl std::error::Error for StartupError {}

impl From<ConfigurationError> for StartupError {
    fn from(err: ConfigurationError) -> Self {
        Self::Configuration(err)
    }
}

impl From<OAuthError> for StartupError {
    fn from(err: OAuthError) -> Self {
        Self::OAuth(err)
    }
}

impl From<TransportError> for StartupError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

/// Errors from authenticated API routes.
#[derive(Debug)]
pub enum ApiError {
    /// A provider call on the user's behalf failed.
    Upstream(FilterError),
    /// The user store failed.
    Store(StoreError),
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        Self::Upstream(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Upstream(err) => {
                tracing::error!(error = %err, "provider request failed");
                (StatusCode::BAD_GATEWAY, "Upstream provider error")
            }
            Self::Store(err) => {
                tracing::error!(error = %err, "user store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };
        (status, message).into_response()
    }
}
