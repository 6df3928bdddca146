//! Discord OAuth2 flow.
//!
//! This module handles the OAuth 2.0 authorization-code flow with PKCE
//! against Discord:
//! - `/auth/login` redirects the browser to the authorization URL
//! - `/auth/callback` exchanges the code for the user's tokens

use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EmptyExtraTokenFields,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, StandardTokenResponse, TokenResponse,
    TokenUrl,
    basic::{BasicClient, BasicTokenType},
};
use std::fmt;
use std::time::Duration;

use crate::config::OAuthConfig;

/// Discord OAuth authorization URL.
const DISCORD_AUTH_URL: &str = "https://discord.com/api/oauth2/authorize";

/// Discord OAuth token URL.
const DISCORD_TOKEN_URL: &str = "https://discord.com/api/oauth2/token";

/// Scopes requested at login: profile, email, and the guild list.
const OAUTH_SCOPES: &[&str] = &["identify", "email", "guilds"];

/// Type alias for the token response type.
type DiscordTokenResponse = StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>;

/// Discord OAuth client configuration.
#[derive(Clone)]
pub struct DiscordOAuthClient {
    client_id: String,
    client_secret: String,
    auth_url: String,
    token_url: String,
    redirect_url: String,
}

/// Per-login state persisted across the redirect round trip.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct OAuthState {
    pub csrf_token: String,
    pub pkce_verifier: String,
}

/// The user's tokens from a completed code exchange.
#[derive(Debug, Clone)]
pub struct ProviderTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<Duration>,
}

impl DiscordOAuthClient {
    /// Creates a new OAuth client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the registered redirect URL is invalid.
    pub fn new(config: &OAuthConfig) -> Result<Self, OAuthError> {
        let _ = RedirectUrl::new(config.redirect_uri.clone())
            .map_err(|e| OAuthError::Configuration(format!("invalid redirect URL: {e}")))?;

        Ok(Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url: DISCORD_AUTH_URL.to_string(),
            token_url: DISCORD_TOKEN_URL.to_string(),
            redirect_url: config.redirect_uri.clone(),
        })
    }

    /// The application's client id. Doubles as the provider-side
    /// principal id of the bot user for membership checks.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Generates the authorization URL for the login flow.
    ///
    /// Returns the URL to redirect the user to, along with state to
    /// persist for validation on callback.
    pub fn authorization_url(&self) -> (String, OAuthState) {
        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(self.auth_url.clone()).expect("valid auth URL"))
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_url.clone()).expect("valid redirect URL"),
            );

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge);

        for scope in OAUTH_SCOPES {
            auth_request = auth_request.add_scope(Scope::new((*scope).to_string()));
        }

        let (auth_url, csrf_token) = auth_request.url();

        let state = OAuthState {
            csrf_token: csrf_token.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        };

        (auth_url.to_string(), state)
    }

    /// Exchanges the authorization code for the user's tokens.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::TokenExchange`] if the provider rejects
    /// the exchange.
    pub async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<ProviderTokens, OAuthError> {
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| OAuthError::TokenExchange(format!("HTTP client error: {e}")))?;

        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_token_uri(TokenUrl::new(self.token_url.clone()).expect("valid token URL"))
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_url.clone()).expect("valid redirect URL"),
            );

        let pkce_verifier = PkceCodeVerifier::new(pkce_verifier.to_string());

        let token_result: DiscordTokenResponse = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http_client)
            .await
            .map_err(|e| OAuthError::TokenExchange(format!("token exchange failed: {e}")))?;

        Ok(ProviderTokens {
            access_token: token_result.access_token().secret().clone(),
            refresh_token: token_result.refresh_token().map(|t| t.secret().clone()),
            expires_in: token_result.expires_in(),
        })
    }
}

/// OAuth flow errors.
#[derive(Debug)]
pub enum OAuthError {
    /// Client registration is invalid.
    Configuration(String),
    /// The code exchange with the provider failed.
    TokenExchange(String),
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "OAuth configuration error: {msg}"),
            Self::TokenExchange(msg) => write!(f, "OAuth token exchange error: {msg}"),
        }
    }
}

impl std::error::Error for OAuthError {}
