//! The application's privileged bot credential.
//!
//! This credential represents the application itself, distinct from any
//! user's session. It is only used to ask the provider whether the bot
//! is a member of a guild.

/// Privileged service-level credential for the bot principal.
///
/// The `Debug` impl redacts the secret so it never leaks into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct BotCredential(String);

impl BotCredential {
    /// Wraps the raw bot token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Renders the provider's `Authorization` header value.
    #[must_use]
    pub fn authorization_value(&self) -> String {
        format!("Bot {}", self.0)
    }

    /// Returns true if the credential is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for BotCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BotCredential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_value_uses_bot_scheme() {
        let credential = BotCredential::new("abc123");
        assert_eq!(credential.authorization_value(), "Bot abc123");
    }

    #[test]
    fn debug_redacts_the_secret() {
        let credential = BotCredential::new("very-secret");
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("redacted"));
    }
}
