//! Authenticated user endpoints.

use axum::{Json, extract::State};
use guildgate_core::UserId;
use guildgate_provider::ManagedGuild;
use serde::Serialize;
use std::sync::Arc;

use crate::auth::{AppState, RequireAuth};
use crate::error::ApiError;

/// The authenticated user's profile and manageable guilds.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: UserId,
    pub username: Option<String>,
    pub avatar: Option<String>,
    pub email: Option<String>,
    /// Guilds the user can administer and where the bot is installed.
    pub guilds: Vec<ManagedGuild>,
}

/// `GET /user/me`: the current user with their manageable guilds.
///
/// The guild list is fetched from the provider with the user's own
/// access token, then narrowed by permission and bot membership.
pub async fn me(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<UserInfo>, ApiError> {
    let guilds = state
        .guild_filter()
        .manageable_guilds(&user.access_token)
        .await?;

    tracing::debug!(user_id = %user.id, guild_count = guilds.len(), "resolved manageable guilds");

    Ok(Json(UserInfo {
        id: user.id,
        username: user.display_name,
        avatar: user.avatar,
        email: user.email,
        guilds: guilds.into_iter().map(ManagedGuild::from).collect(),
    }))
}
