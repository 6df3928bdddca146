//! Authentication routes for login and callback.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use guildgate_core::UserId;
use guildgate_platform_access::{AuthenticatedIdentity, CompletionError, ProviderKind};
use serde::Deserialize;
use std::sync::Arc;
use time::Duration as TimeDuration;

use super::{AppState, oauth::OAuthState};
use crate::store::StoredUser;

/// Redirect target cookie name. Holds where to send the browser after
/// login completes.
const REDIRECT_COOKIE: &str = "redirect_uri";

/// Auth state cookie name (CSRF token and PKCE verifier).
const AUTH_STATE_COOKIE: &str = "auth_state";

/// How long the transient login cookies live.
const LOGIN_COOKIE_MINUTES: i64 = 10;

/// Query parameters for login initiation.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    /// Optional post-login redirect target. Validated against the
    /// allow-list at completion time, not here.
    redirect_uri: Option<String>,
}

/// Query parameters for the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: String,
    state: String,
}

/// Initiates the login flow by redirecting to the identity provider.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoginQuery>,
    jar: CookieJar,
) -> impl IntoResponse {
    let (auth_url, oauth_state) = state.oauth.authorization_url();

    let oauth_state_json = serde_json::to_string(&oauth_state).expect("serialize auth state");
    let mut jar = jar.add(login_cookie(
        AUTH_STATE_COOKIE,
        oauth_state_json,
        state.secure_cookies,
    ));

    if let Some(target) = query.redirect_uri {
        jar = jar.add(login_cookie(REDIRECT_COOKIE, target, state.secure_cookies));
    }

    (jar, Redirect::to(&auth_url))
}

/// Handles the OAuth callback after the user authenticates with the
/// identity provider: code exchange, profile fetch, user upsert, then
/// login completion into a token-bearing redirect.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<Response, AuthError> {
    let oauth_cookie = jar.get(AUTH_STATE_COOKIE).ok_or(AuthError::MissingAuthState)?;
    let oauth_state: OAuthState =
        serde_json::from_str(oauth_cookie.value()).map_err(|_| AuthError::InvalidAuthState)?;

    if query.state != oauth_state.csrf_token {
        return Err(AuthError::CsrfMismatch);
    }

    let tokens = state
        .oauth
        .exchange_code(&query.code, &oauth_state.pkce_verifier)
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

    let attributes = state
        .provider
        .fetch_profile(&tokens.access_token)
        .await
        .map_err(|e| AuthError::Provider(e.to_string()))?;
    let profile = ProviderKind::Discord
        .extract_profile(&attributes)
        .map_err(|e| AuthError::Provider(e.to_string()))?;

    // Find or create the user, refreshing their profile and access
    // token on every login.
    let existing = state
        .store
        .find_by_subject(ProviderKind::Discord, &profile.subject)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

    let now = Utc::now();
    let token_expires_at = tokens
        .expires_in
        .and_then(|d| chrono::Duration::from_std(d).ok())
        .map(|d| now + d);
    let record = match existing {
        Some(mut user) => {
            user.display_name = profile.username;
            user.avatar = profile.avatar;
            user.email = profile.email;
            user.access_token = tokens.access_token.clone();
            user.refresh_token = tokens.refresh_token.clone();
            user.token_expires_at = token_expires_at;
            user.updated_at = now;
            user
        }
        None => StoredUser {
            id: UserId::new(),
            provider: ProviderKind::Discord,
            subject: profile.subject,
            display_name: profile.username,
            avatar: profile.avatar,
            email: profile.email,
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            token_expires_at,
            created_at: now,
            updated_at: now,
        },
    };
    let user = state
        .store
        .upsert(record)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

    let identity = AuthenticatedIdentity {
        user_id: user.id,
        provider: user.provider,
        subject: user.subject.clone(),
    };

    let stored_target = jar.get(REDIRECT_COOKIE).map(|c| c.value().to_string());
    let outcome =
        state
            .login_completion()
            .complete(stored_target.as_deref(), &identity, now, false)?;

    // Clear the transient login cookies exactly once; removal is
    // idempotent since the redirect cookie may never have been set.
    let jar = jar
        .add(remove_cookie(AUTH_STATE_COOKIE))
        .add(remove_cookie(REDIRECT_COOKIE));

    let target = outcome
        .redirect
        .unwrap_or_else(|| state.default_redirect.clone());
    Ok((jar, Redirect::to(&target)).into_response())
}

fn login_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(LOGIN_COOKIE_MINUTES))
        .build()
}

fn remove_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .max_age(TimeDuration::ZERO)
        .build()
}

/// Authentication errors.
#[derive(Debug)]
pub enum AuthError {
    MissingAuthState,
    InvalidAuthState,
    CsrfMismatch,
    UnauthorizedRedirect(String),
    TokenExchange(String),
    TokenIssuance(String),
    Provider(String),
    Store(String),
}

impl From<CompletionError> for AuthError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::UnauthorizedRedirect { target } => Self::UnauthorizedRedirect(target),
            CompletionError::Token(err) => Self::TokenIssuance(err.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingAuthState => (StatusCode::BAD_REQUEST, "Missing auth state"),
            Self::InvalidAuthState => (StatusCode::BAD_REQUEST, "Invalid auth state"),
            Self::CsrfMismatch => (StatusCode::BAD_REQUEST, "CSRF token mismatch"),
            Self::UnauthorizedRedirect(target) => {
                tracing::warn!(redirect_target = %target, "rejected unauthorized redirect target");
                (StatusCode::BAD_REQUEST, "Unauthorized redirect target")
            }
            Self::TokenExchange(msg) => {
                tracing::error!("Token exchange failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed")
            }
            Self::TokenIssuance(msg) => {
                tracing::error!("Token issuance failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed")
            }
            Self::Provider(msg) => {
                tracing::error!("Provider profile fetch failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed")
            }
            Self::Store(msg) => {
                tracing::error!("User store error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, message).into_response()
    }
}
