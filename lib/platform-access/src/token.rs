//! Application token issuance and verification.
//!
//! After a successful provider login the server mints its own signed,
//! expiring token so later requests can be authenticated without a
//! database lookup: a verifier needs only the shared secret. Tokens are
//! compact HS512 JWTs with `sub`/`iat`/`exp` claims.

use crate::error::{ConfigurationError, TokenError};
use crate::identity::AuthenticatedIdentity;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};

/// Claims carried by an application token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppClaims {
    /// Internal user id, rendered as a string.
    pub sub: String,
    /// Issuance time, seconds since the epoch.
    pub iat: i64,
    /// Expiry time, seconds since the epoch. Always greater than `iat`.
    pub exp: i64,
}

/// An opaque, self-contained signed application token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppToken(String);

impl AppToken {
    /// Returns the compact serialized form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token, returning the compact serialized form.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for AppToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues and verifies application tokens with a symmetric secret.
///
/// Constructed once at startup from configuration; a missing secret or
/// non-positive lifetime is a configuration error, not something to
/// recover from at request time. The `Debug` impl redacts the keys so
/// the secret never leaks into logs.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
    validation: Validation,
}

impl TokenIssuer {
    /// Creates a token issuer from the signing secret and lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingTokenSecret`] for an empty
    /// secret and [`ConfigurationError::NonPositiveTokenLifetime`] for
    /// a lifetime of zero or less milliseconds.
    pub fn new(secret: &str, lifetime_ms: i64) -> Result<Self, ConfigurationError> {
        if secret.is_empty() {
            return Err(ConfigurationError::MissingTokenSecret);
        }
        if lifetime_ms <= 0 {
            return Err(ConfigurationError::NonPositiveTokenLifetime { lifetime_ms });
        }

        let mut validation = Validation::new(Algorithm::HS512);
        // Exact expiry; no clock leeway.
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::milliseconds(lifetime_ms),
            validation,
        })
    }

    /// Returns the configured token lifetime.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Mints a fresh token for the authenticated identity.
    ///
    /// The subject claim is the internal user id; expiry is measured
    /// from `now` using the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if signing fails.
    pub fn issue(
        &self,
        identity: &AuthenticatedIdentity,
        now: DateTime<Utc>,
    ) -> Result<AppToken, TokenError> {
        let claims = AppClaims {
            sub: identity.user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| TokenError::Signing {
            reason: e.to_string(),
        })?;

        Ok(AppToken(token))
    }

    /// Verifies a compact token and returns its claims.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Expired`] when `exp` has passed,
    /// - [`TokenError::InvalidSignature`] when the secret does not match,
    /// - [`TokenError::Malformed`] for any structurally invalid token.
    pub fn verify(&self, token: &str) -> Result<AppClaims, TokenError> {
        jsonwebtoken::decode::<AppClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed {
                    reason: e.to_string(),
                },
            })
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ProviderKind;
    use guildgate_core::UserId;

    const HOUR_MS: i64 = 3_600_000;

    fn identity() -> AuthenticatedIdentity {
        AuthenticatedIdentity {
            user_id: UserId::new(),
            provider: ProviderKind::Discord,
            subject: "190405607035".to_string(),
        }
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        assert_eq!(
            TokenIssuer::new("", HOUR_MS).unwrap_err(),
            ConfigurationError::MissingTokenSecret
        );
    }

    #[test]
    fn non_positive_lifetime_is_a_configuration_error() {
        assert_eq!(
            TokenIssuer::new("secret", 0).unwrap_err(),
            ConfigurationError::NonPositiveTokenLifetime { lifetime_ms: 0 }
        );
        assert!(TokenIssuer::new("secret", -1).is_err());
    }

    #[test]
    fn issue_then_verify_reports_same_subject() {
        let issuer = TokenIssuer::new("secret", HOUR_MS).expect("issuer");
        let identity = identity();
        let token = issuer.issue(&identity, Utc::now()).expect("issue");

        let claims = issuer.verify(token.as_str()).expect("verify");
        assert_eq!(claims.sub, identity.user_id.to_string());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expiry_is_lifetime_from_issuance() {
        let issuer = TokenIssuer::new("secret", HOUR_MS).expect("issuer");
        let now = Utc::now();
        let token = issuer.issue(&identity(), now).expect("issue");
        let claims = issuer.verify(token.as_str()).expect("verify");
        assert_eq!(claims.exp - claims.iat, HOUR_MS / 1000);
    }

    #[test]
    fn verify_after_expiry_fails_with_expiry_error() {
        let issuer = TokenIssuer::new("secret", HOUR_MS).expect("issuer");
        // Issue a token whose lifetime has already elapsed.
        let past = Utc::now() - Duration::milliseconds(HOUR_MS) - Duration::seconds(2);
        let token = issuer.issue(&identity(), past).expect("issue");

        assert_eq!(issuer.verify(token.as_str()), Err(TokenError::Expired));
    }

    #[test]
    fn verify_with_different_secret_fails_with_signature_error() {
        let issuer = TokenIssuer::new("secret-a", HOUR_MS).expect("issuer");
        let other = TokenIssuer::new("secret-b", HOUR_MS).expect("issuer");
        let token = issuer.issue(&identity(), Utc::now()).expect("issue");

        assert_eq!(
            other.verify(token.as_str()),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn debug_output_does_not_leak_the_secret() {
        let issuer = TokenIssuer::new("very-secret", HOUR_MS).expect("issuer");
        let rendered = format!("{issuer:?}");
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("lifetime"));
    }

    #[test]
    fn verify_rejects_garbage() {
        let issuer = TokenIssuer::new("secret", HOUR_MS).expect("issuer");
        assert!(matches!(
            issuer.verify("not-a-jwt"),
            Err(TokenError::Malformed { .. })
        ));
    }
}
