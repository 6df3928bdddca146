//! Login completion: turn a finished provider authentication into a
//! token-bearing redirect.
//!
//! The flow is a small state machine:
//!
//! ```text
//! AWAITING_REDIRECT_COOKIE -> VALIDATING -> TOKEN_ISSUED -> REDIRECTING -> DONE
//!                                  |
//!                                  v
//!                               ABORTED
//! ```
//!
//! The caller owns the transport details (cookies, the HTTP redirect
//! itself) and must clear all transient authentication artifacts
//! exactly once after `complete` returns on any non-aborted path;
//! clearing must be idempotent since some artifacts may never have
//! been set.

use crate::error::TokenError;
use crate::identity::AuthenticatedIdentity;
use crate::redirect::AllowedRedirectSet;
use crate::token::{AppToken, TokenIssuer};
use chrono::{DateTime, Utc};
use url::Url;

/// Query parameter name carrying the application token.
const TOKEN_PARAM: &str = "token";

/// States of the login completion flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    /// Reading the persisted redirect target.
    AwaitingRedirectCookie,
    /// Checking the target against the allow-list.
    Validating,
    /// Application token minted.
    TokenIssued,
    /// Building the redirect response.
    Redirecting,
    /// Flow finished, transient state may be cleared.
    Done,
    /// Unauthorized target; no token issued.
    Aborted,
}

/// Errors from login completion.
#[derive(Debug, PartialEq, Eq)]
pub enum CompletionError {
    /// The client-supplied redirect target is not on the allow-list.
    /// Surfaced as a client-facing bad request.
    UnauthorizedRedirect { target: String },
    /// Token issuance failed.
    Token(TokenError),
}

impl std::fmt::Display for CompletionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnauthorizedRedirect { target } => {
                write!(f, "unauthorized redirect target '{target}'")
            }
            Self::Token(err) => write!(f, "token issuance failed: {err}"),
        }
    }
}

impl std::error::Error for CompletionError {}

impl From<TokenError> for CompletionError {
    fn from(err: TokenError) -> Self {
        Self::Token(err)
    }
}

/// Outcome of a completed login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    /// The redirect target with the token appended, or `None` when the
    /// response was already committed and redirecting was skipped.
    pub redirect: Option<String>,
    /// The token minted for this login.
    pub token: AppToken,
}

/// Completes a successful provider authentication.
///
/// Holds references to the process-wide, read-only pieces: the token
/// issuer, the redirect allow-list, and the configured default target.
pub struct LoginCompletion<'a> {
    issuer: &'a TokenIssuer,
    allowed: &'a AllowedRedirectSet,
    default_target: &'a str,
}

impl<'a> LoginCompletion<'a> {
    /// Creates a completion flow over the given shared state.
    #[must_use]
    pub fn new(
        issuer: &'a TokenIssuer,
        allowed: &'a AllowedRedirectSet,
        default_target: &'a str,
    ) -> Self {
        Self {
            issuer,
            allowed,
            default_target,
        }
    }

    /// Runs the completion state machine.
    ///
    /// `stored_target` is the redirect cookie value, if one was set; an
    /// absent cookie is valid and falls back to the configured default.
    /// `response_committed` signals that the transport already wrote a
    /// response, in which case redirecting is skipped without error.
    ///
    /// # Errors
    ///
    /// - [`CompletionError::UnauthorizedRedirect`] when a present
    ///   target fails validation; no token is issued.
    /// - [`CompletionError::Token`] when signing fails.
    pub fn complete(
        &self,
        stored_target: Option<&str>,
        identity: &AuthenticatedIdentity,
        now: DateTime<Utc>,
        response_committed: bool,
    ) -> Result<CompletionOutcome, CompletionError> {
        let mut state = CompletionState::AwaitingRedirectCookie;
        tracing::debug!(?state, has_cookie = stored_target.is_some(), "completing login");

        state = CompletionState::Validating;
        tracing::debug!(?state, "checking redirect target against allow-list");
        if let Some(target) = stored_target
            && !self.allowed.is_authorized(target)
        {
            tracing::warn!(redirect_target = %target, "aborting login: unauthorized redirect target");
            return Err(CompletionError::UnauthorizedRedirect {
                target: target.to_string(),
            });
        }
        let target = stored_target.unwrap_or(self.default_target);

        let token = self.issuer.issue(identity, now)?;
        state = CompletionState::TokenIssued;
        tracing::debug!(?state, user_id = %identity.user_id, "issued application token");

        state = CompletionState::Redirecting;
        if response_committed {
            // Benign race: another writer got there first. Skip the
            // redirect, still report success so state gets cleared.
            tracing::debug!(?state, redirect_target = %target, "response already committed, skipping redirect");
            return Ok(CompletionOutcome {
                redirect: None,
                token,
            });
        }

        let redirect = append_token(target, &token).ok_or_else(|| {
            CompletionError::UnauthorizedRedirect {
                target: target.to_string(),
            }
        })?;

        state = CompletionState::Done;
        tracing::debug!(?state, "login complete");
        Ok(CompletionOutcome {
            redirect: Some(redirect),
            token,
        })
    }
}

/// Appends the token as a query parameter, preserving existing ones.
fn append_token(target: &str, token: &AppToken) -> Option<String> {
    let mut url = Url::parse(target).ok()?;
    url.query_pairs_mut().append_pair(TOKEN_PARAM, token.as_str());
    Some(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ProviderKind;
    use guildgate_core::UserId;

    const HOUR_MS: i64 = 3_600_000;
    const DEFAULT_TARGET: &str = "https://app.example.com/home";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("completion-secret", HOUR_MS).expect("issuer")
    }

    fn allowed() -> AllowedRedirectSet {
        AllowedRedirectSet::from_uris([DEFAULT_TARGET]).expect("allow-list")
    }

    fn identity() -> AuthenticatedIdentity {
        AuthenticatedIdentity {
            user_id: UserId::new(),
            provider: ProviderKind::Discord,
            subject: "190405607035".to_string(),
        }
    }

    #[test]
    fn missing_cookie_falls_back_to_default_target() {
        let issuer = issuer();
        let allowed = allowed();
        let completion = LoginCompletion::new(&issuer, &allowed, DEFAULT_TARGET);

        let outcome = completion
            .complete(None, &identity(), Utc::now(), false)
            .expect("absent cookie is not an error");

        let redirect = outcome.redirect.expect("redirect present");
        assert!(redirect.starts_with(DEFAULT_TARGET));
        assert!(redirect.contains("token="));
    }

    #[test]
    fn authorized_cookie_target_is_used_with_token_appended() {
        let issuer = issuer();
        let allowed = allowed();
        let completion = LoginCompletion::new(&issuer, &allowed, DEFAULT_TARGET);

        let outcome = completion
            .complete(
                Some("https://app.example.com/finish?x=1"),
                &identity(),
                Utc::now(),
                false,
            )
            .expect("authorized target");

        let redirect = outcome.redirect.expect("redirect present");
        // Existing query parameters survive.
        assert!(redirect.contains("x=1"));
        assert!(redirect.contains("token="));
        // The minted token round-trips through the redirect URL.
        let url = Url::parse(&redirect).expect("parse");
        let token = url
            .query_pairs()
            .find(|(k, _)| k == "token")
            .map(|(_, v)| v.into_owned())
            .expect("token param");
        assert_eq!(token, outcome.token.as_str());
    }

    #[test]
    fn unauthorized_target_aborts_before_token_issuance() {
        let issuer = issuer();
        let allowed = allowed();
        let completion = LoginCompletion::new(&issuer, &allowed, DEFAULT_TARGET);

        let err = completion
            .complete(
                Some("https://evil.example.net/steal"),
                &identity(),
                Utc::now(),
                false,
            )
            .unwrap_err();

        assert_eq!(
            err,
            CompletionError::UnauthorizedRedirect {
                target: "https://evil.example.net/steal".to_string()
            }
        );
    }

    #[test]
    fn committed_response_skips_redirect_without_error() {
        let issuer = issuer();
        let allowed = allowed();
        let completion = LoginCompletion::new(&issuer, &allowed, DEFAULT_TARGET);

        let outcome = completion
            .complete(None, &identity(), Utc::now(), true)
            .expect("benign race");
        assert!(outcome.redirect.is_none());
    }

    #[test]
    fn issued_token_verifies_for_the_subject() {
        let issuer = issuer();
        let allowed = allowed();
        let completion = LoginCompletion::new(&issuer, &allowed, DEFAULT_TARGET);
        let identity = identity();

        let outcome = completion
            .complete(None, &identity, Utc::now(), false)
            .expect("complete");
        let claims = issuer.verify(outcome.token.as_str()).expect("verify");
        assert_eq!(claims.sub, identity.user_id.to_string());
    }
}
