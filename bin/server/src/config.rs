//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables with a
//! `__` section separator (e.g. `AUTH__TOKEN_SECRET`).

use guildgate_provider::MembershipFailurePolicy;
use serde::Deserialize;

/// Server configuration composed from per-concern sections.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Token and redirect configuration.
    pub auth: AuthConfig,

    /// OAuth2 application registration with the provider.
    pub oauth: OAuthConfig,

    /// Provider API access configuration.
    pub provider: ProviderConfig,
}

/// Application token and post-login redirect configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Symmetric secret for signing application tokens. Required.
    pub token_secret: String,

    /// Application token lifetime in milliseconds.
    #[serde(default = "default_token_lifetime_ms")]
    pub token_lifetime_ms: i64,

    /// Where to send the browser after login when no target was stored.
    pub default_redirect_uri: String,

    /// Comma-separated list of additional authorized redirect targets.
    /// Matching is by host and port only.
    #[serde(default)]
    pub authorized_redirect_uris: String,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local
    /// HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

impl AuthConfig {
    /// All authorized redirect targets. The default target is always
    /// included so a cookie pointing at it passes validation.
    #[must_use]
    pub fn authorized_uris(&self) -> Vec<&str> {
        let mut uris: Vec<&str> = self
            .authorized_redirect_uris
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .collect();
        uris.push(self.default_redirect_uri.as_str());
        uris
    }
}

/// OAuth2 client registration.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    /// Application client id. Also the provider-side principal id of
    /// the bot user, used for guild membership checks.
    pub client_id: String,

    /// Application client secret.
    pub client_secret: String,

    /// Callback URL registered with the provider.
    pub redirect_uri: String,
}

/// Provider API access configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider's REST API, without a trailing slash.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Privileged bot token for membership checks. Required.
    pub bot_token: String,

    /// User-Agent sent on every provider API call.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Maximum concurrent membership checks per guild listing.
    #[serde(default = "default_membership_concurrency")]
    pub membership_concurrency: usize,

    /// What to do when a membership check fails for a reason other
    /// than "bot not installed".
    #[serde(default)]
    pub membership_failure_policy: MembershipFailurePolicy,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_token_lifetime_ms() -> i64 {
    3_600_000
}

fn default_secure_cookies() -> bool {
    true
}

fn default_api_base() -> String {
    "https://discord.com/api".to_string()
}

fn default_user_agent() -> String {
    "guildgate (https://github.com/guildgate/guildgate, 0.1.0)".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_membership_concurrency() -> usize {
    4
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_config(authorized: &str) -> AuthConfig {
        AuthConfig {
            token_secret: "secret".to_string(),
            token_lifetime_ms: default_token_lifetime_ms(),
            default_redirect_uri: "https://app.example.com/home".to_string(),
            authorized_redirect_uris: authorized.to_string(),
            secure_cookies: true,
        }
    }

    #[test]
    fn authorized_uris_always_include_the_default_target() {
        let config = auth_config("");
        assert_eq!(config.authorized_uris(), ["https://app.example.com/home"]);
    }

    #[test]
    fn authorized_uris_split_and_trim() {
        let config = auth_config("https://a.example.com, https://b.example.com:8443 ,");
        assert_eq!(
            config.authorized_uris(),
            [
                "https://a.example.com",
                "https://b.example.com:8443",
                "https://app.example.com/home",
            ]
        );
    }

    #[test]
    fn provider_defaults() {
        assert_eq!(default_api_base(), "https://discord.com/api");
        assert_eq!(default_request_timeout_ms(), 10_000);
        assert_eq!(default_membership_concurrency(), 4);
    }
}
