//! Identity-provider dispatch and profile extraction.
//!
//! Supported providers are a closed set of variants dispatched by a
//! registration key. Adding a provider means adding a variant and its
//! extraction arm, not a subclass.

use crate::error::IdentityError;
use guildgate_core::UserId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Supported third-party identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Discord OAuth2.
    Discord,
}

impl ProviderKind {
    /// Resolves a provider from its registration key, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::UnsupportedProvider`] for unknown keys.
    pub fn from_registration_id(registration_id: &str) -> Result<Self, IdentityError> {
        match registration_id.to_ascii_lowercase().as_str() {
            "discord" => Ok(Self::Discord),
            _ => Err(IdentityError::UnsupportedProvider {
                registration_id: registration_id.to_string(),
            }),
        }
    }

    /// Returns the registration key for this provider.
    #[must_use]
    pub fn registration_id(&self) -> &'static str {
        match self {
            Self::Discord => "discord",
        }
    }

    /// Extracts a normalized profile from the provider's raw attribute map.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::MissingAttribute`] when the payload
    /// lacks the provider's account identifier.
    pub fn extract_profile(&self, attributes: &Value) -> Result<ProviderProfile, IdentityError> {
        match self {
            Self::Discord => {
                let subject = attributes
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or(IdentityError::MissingAttribute {
                        provider: "discord",
                        attribute: "id",
                    })?
                    .to_string();

                Ok(ProviderProfile {
                    subject,
                    username: string_attr(attributes, "username"),
                    avatar: string_attr(attributes, "avatar"),
                    email: string_attr(attributes, "email"),
                })
            }
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.registration_id())
    }
}

fn string_attr(attributes: &Value, key: &str) -> Option<String> {
    attributes
        .get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

/// Normalized account profile extracted from a provider payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    /// The provider's unique account identifier.
    pub subject: String,
    /// Display name, if the provider exposes one.
    pub username: Option<String>,
    /// Avatar reference, if any.
    pub avatar: Option<String>,
    /// Email address, if the requested scopes include it.
    pub email: Option<String>,
}

/// The identity produced by a completed authentication event.
///
/// Immutable per event: the identity-exchange step produces it, the
/// token issuer consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    /// Internal user id.
    pub user_id: UserId,
    /// Which provider authenticated the user.
    pub provider: ProviderKind,
    /// The provider's account identifier for the user.
    pub subject: String,
}
