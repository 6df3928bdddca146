//! User persistence.
//!
//! The store keeps one record per provider account, keyed by an
//! internal [`UserId`]. The user's provider access token lives here so
//! `/user/me` can list guilds on their behalf; it is never serialized
//! into responses.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guildgate_core::UserId;
use guildgate_platform_access::ProviderKind;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;

/// A persisted dashboard user.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: UserId,
    pub provider: ProviderKind,
    /// The provider's account identifier.
    pub subject: String,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub email: Option<String>,
    /// The user's provider access token from their latest login.
    pub access_token: String,
    /// Refresh token, when the provider issued one.
    pub refresh_token: Option<String>,
    /// When the access token expires, if the provider said.
    pub token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Errors from the user store backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub reason: String,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user store error: {}", self.reason)
    }
}

impl std::error::Error for StoreError {}

/// Backend-agnostic user persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<StoredUser>, StoreError>;

    async fn find_by_subject(
        &self,
        provider: ProviderKind,
        subject: &str,
    ) -> Result<Option<StoredUser>, StoreError>;

    /// Inserts or replaces the record with the user's id.
    async fn upsert(&self, user: StoredUser) -> Result<StoredUser, StoreError>;
}

/// In-memory store. Records live for the process lifetime.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, StoredUser>>,
}

impl InMemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<StoredUser>, StoreError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_subject(
        &self,
        provider: ProviderKind,
        subject: &str,
    ) -> Result<Option<StoredUser>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.provider == provider && user.subject == subject)
            .cloned())
    }

    async fn upsert(&self, user: StoredUser) -> Result<StoredUser, StoreError> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(user)
    }
}
