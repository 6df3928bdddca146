//! Authentication module for the guildgate server.
//!
//! This module provides:
//! - The Discord OAuth2 login flow (`/auth/login`, `/auth/callback`)
//! - Application token issuance on login completion
//! - Authentication middleware/extractors for Axum routes
//!
//! # Trust Domains
//!
//! Three credentials flow through here and must not be confused:
//! - the end user's OAuth access token, stored per user and replayed
//!   only against the provider on their behalf,
//! - the process-wide token-signing secret behind [`TokenIssuer`],
//! - the privileged [`BotCredential`], used only for guild membership
//!   checks and never tied to any user session.

pub mod middleware;
pub mod oauth;
pub mod routes;

pub use middleware::RequireAuth;
pub use oauth::DiscordOAuthClient;
pub use routes::{callback, login};

use crate::config::ServerConfig;
use crate::error::StartupError;
use crate::store::UserStore;
use guildgate_platform_access::{AllowedRedirectSet, LoginCompletion, TokenIssuer};
use guildgate_provider::{
    BotCredential, GuildFilter, HttpTransport, MembershipFailurePolicy, ProviderClient,
};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state.
pub struct AppState {
    /// User persistence.
    pub store: Arc<dyn UserStore>,
    /// OAuth client for the login flow.
    pub oauth: DiscordOAuthClient,
    /// Application token issuer and verifier.
    pub issuer: TokenIssuer,
    /// Authorized post-login redirect targets.
    pub allowed: AllowedRedirectSet,
    /// Redirect target when no cookie was stored.
    pub default_redirect: String,
    /// Provider API client.
    pub provider: ProviderClient<HttpTransport>,
    /// Privileged bot credential for membership checks.
    pub bot: BotCredential,
    /// Bound on concurrent membership checks.
    pub membership_concurrency: usize,
    /// Resolution for failed membership checks.
    pub membership_failure_policy: MembershipFailurePolicy,
    /// Whether to set the Secure flag on cookies.
    pub secure_cookies: bool,
}

impl AppState {
    /// Builds the application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError`] when the token secret, lifetime,
    /// redirect allow-list, OAuth registration, or HTTP client
    /// configuration is invalid.
    pub fn from_config(
        config: &ServerConfig,
        store: Arc<dyn UserStore>,
    ) -> Result<Self, StartupError> {
        let issuer = TokenIssuer::new(&config.auth.token_secret, config.auth.token_lifetime_ms)?;
        let allowed = AllowedRedirectSet::from_uris(config.auth.authorized_uris())?;
        let oauth = DiscordOAuthClient::new(&config.oauth)?;

        let transport =
            HttpTransport::new(Duration::from_millis(config.provider.request_timeout_ms))?;
        let provider = ProviderClient::new(
            transport,
            &config.provider.api_base,
            &config.provider.user_agent,
        );
        let bot = BotCredential::new(&config.provider.bot_token);
        if bot.is_empty() {
            return Err(StartupError::MissingBotToken);
        }

        Ok(Self {
            store,
            oauth,
            issuer,
            allowed,
            default_redirect: config.auth.default_redirect_uri.clone(),
            provider,
            bot,
            membership_concurrency: config.provider.membership_concurrency,
            membership_failure_policy: config.provider.membership_failure_policy,
            secure_cookies: config.auth.secure_cookies,
        })
    }

    /// The login completion flow over this state.
    #[must_use]
    pub fn login_completion(&self) -> LoginCompletion<'_> {
        LoginCompletion::new(&self.issuer, &self.allowed, &self.default_redirect)
    }

    /// The manageable-guild filter over this state.
    #[must_use]
    pub fn guild_filter(&self) -> GuildFilter<'_, HttpTransport> {
        GuildFilter::new(
            &self.provider,
            &self.bot,
            self.oauth.client_id(),
            self.membership_concurrency,
            self.membership_failure_policy,
        )
    }
}
