//! Error types for the platform-access crate.
//!
//! - `ConfigurationError`: invalid process-wide configuration, fatal at startup
//! - `TokenError`: application token issuance/verification failures
//! - `InvalidBitmaskError`: malformed permission data from the provider
//! - `IdentityError`: provider profile extraction failures

use std::fmt;

/// Errors in process-wide authentication configuration.
///
/// These are construction-time failures. They are never produced while
/// serving a request; a process that reaches its bind call has a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The token signing secret is absent or empty.
    MissingTokenSecret,
    /// The configured token lifetime is zero or negative.
    NonPositiveTokenLifetime { lifetime_ms: i64 },
    /// An authorized-redirect entry could not be parsed as a URI with a host.
    MalformedRedirectEntry { entry: String, reason: String },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTokenSecret => {
                write!(f, "token signing secret is missing or empty")
            }
            Self::NonPositiveTokenLifetime { lifetime_ms } => {
                write!(f, "token lifetime must be positive, got {lifetime_ms}ms")
            }
            Self::MalformedRedirectEntry { entry, reason } => {
                write!(f, "malformed authorized redirect entry '{entry}': {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Errors from application token operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token's expiry timestamp has passed.
    Expired,
    /// The signature does not validate against the issuing secret.
    InvalidSignature,
    /// The token is structurally invalid.
    Malformed { reason: String },
    /// Signing the composed claims failed.
    Signing { reason: String },
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "application token has expired"),
            Self::InvalidSignature => write!(f, "application token signature is invalid"),
            Self::Malformed { reason } => write!(f, "malformed application token: {reason}"),
            Self::Signing { reason } => write!(f, "failed to sign application token: {reason}"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Error returned when a permission bitmask is not a valid 64-bit integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidBitmaskError {
    /// The raw value the provider sent.
    pub raw: String,
}

impl fmt::Display for InvalidBitmaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid permission bitmask '{}'", self.raw)
    }
}

impl std::error::Error for InvalidBitmaskError {}

/// Errors from identity-provider profile extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// No provider is registered under the given registration key.
    UnsupportedProvider { registration_id: String },
    /// The provider's profile payload lacks a required attribute.
    MissingAttribute {
        provider: &'static str,
        attribute: &'static str,
    },
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedProvider { registration_id } => {
                write!(f, "login with '{registration_id}' is not supported")
            }
            Self::MissingAttribute {
                provider,
                attribute,
            } => {
                write!(
                    f,
                    "provider '{provider}' profile is missing attribute '{attribute}'"
                )
            }
        }
    }
}

impl std::error::Error for IdentityError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_display() {
        let err = ConfigurationError::NonPositiveTokenLifetime { lifetime_ms: -5 };
        assert!(err.to_string().contains("-5ms"));

        let err = ConfigurationError::MalformedRedirectEntry {
            entry: "::::".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert!(err.to_string().contains("::::"));
    }

    #[test]
    fn token_error_display() {
        assert!(TokenError::Expired.to_string().contains("expired"));
        assert!(
            TokenError::InvalidSignature
                .to_string()
                .contains("signature")
        );
    }

    #[test]
    fn invalid_bitmask_error_display() {
        let err = InvalidBitmaskError {
            raw: "forty".to_string(),
        };
        assert!(err.to_string().contains("forty"));
    }

    #[test]
    fn identity_error_display() {
        let err = IdentityError::UnsupportedProvider {
            registration_id: "myspace".to_string(),
        };
        assert!(err.to_string().contains("myspace"));
    }
}
