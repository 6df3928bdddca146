//! Authentication middleware and extractors for Axum.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use guildgate_core::UserId;
use guildgate_platform_access::TokenError;
use std::sync::Arc;

use super::AppState;
use crate::store::StoredUser;

/// Extractor for requiring an authenticated user.
///
/// Expects an `Authorization: Bearer <token>` header carrying an
/// application token minted at login.
pub struct RequireAuth(pub StoredUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);

        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthRejection::MissingToken)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthRejection::MissingToken)?;

        let claims = app_state.issuer.verify(token).map_err(|err| match err {
            TokenError::Expired => AuthRejection::TokenExpired,
            _ => AuthRejection::InvalidToken,
        })?;

        // The subject claim is the internal user id.
        let user_id: UserId = claims.sub.parse().map_err(|_| AuthRejection::InvalidToken)?;

        let user = app_state
            .store
            .find_by_id(&user_id)
            .await
            .map_err(|_| AuthRejection::InternalError)?
            .ok_or(AuthRejection::UnknownUser)?;

        Ok(RequireAuth(user))
    }
}

/// Rejection type for authentication extractors.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthRejection {
    MissingToken,
    TokenExpired,
    InvalidToken,
    UnknownUser,
    InternalError,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::MissingToken => {
                (StatusCode::UNAUTHORIZED, "Missing bearer token").into_response()
            }
            Self::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired").into_response(),
            Self::InvalidToken | Self::UnknownUser => {
                (StatusCode::UNAUTHORIZED, "Invalid token").into_response()
            }
            Self::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
