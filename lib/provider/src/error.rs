//! Error types for provider API access.

use crate::transport::TransportError;
use std::fmt;

/// Errors from a single provider API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The request never produced an HTTP response.
    Transport(TransportError),
    /// The provider answered with an unexpected status code.
    UnexpectedStatus { status: u16 },
    /// The response body could not be interpreted.
    MalformedResponse { reason: String },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "provider transport error: {err}"),
            Self::UnexpectedStatus { status } => {
                write!(f, "provider responded with unexpected status {status}")
            }
            Self::MalformedResponse { reason } => {
                write!(f, "malformed provider response: {reason}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<TransportError> for ProviderError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

/// Errors from the manageable-guild filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Listing the user's guilds failed. Fatal for the request: no
    /// partial guild list is ever returned.
    Listing(ProviderError),
    /// A membership check failed and the configured policy aborts the
    /// whole batch.
    Membership {
        guild_id: String,
        source: ProviderError,
    },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listing(err) => write!(f, "failed to list guilds: {err}"),
            Self::Membership { guild_id, source } => {
                write!(f, "membership check for guild {guild_id} failed: {source}")
            }
        }
    }
}

impl std::error::Error for FilterError {}
