//! Narrows a user's guild list to the guilds the dashboard can manage.
//!
//! Two gates, in order: the user must own the guild or hold a
//! manage/administrator permission, and the bot itself must be
//! installed there. The second gate needs the privileged bot
//! credential and one provider call per guild; those calls run
//! concurrently under a bounded limit so the provider's rate limits
//! are respected, and the result keeps the input order.

use crate::client::{MembershipCheck, ProviderClient};
use crate::credential::BotCredential;
use crate::error::{FilterError, ProviderError};
use crate::guild::Guild;
use crate::transport::{ApiTransport, TransportError};
use futures::StreamExt;
use futures::stream;
use serde::{Deserialize, Serialize};

/// How to resolve a membership check that failed for a reason other
/// than "bot not installed" (e.g. rate limiting or a 5xx).
///
/// The provider cannot distinguish a flaky check from genuine absence,
/// so the resolution is an explicit deployment choice rather than a
/// hard-coded conflation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipFailurePolicy {
    /// Drop the affected guild and keep the rest. Availability bias:
    /// one flaky guild never takes down the whole listing.
    #[default]
    DropGuild,
    /// Abort the whole batch with an error.
    AbortBatch,
}

/// Filters a user's guilds down to the manageable, bot-installed set.
pub struct GuildFilter<'a, T> {
    client: &'a ProviderClient<T>,
    credential: &'a BotCredential,
    app_user_id: &'a str,
    concurrency: usize,
    policy: MembershipFailurePolicy,
}

impl<'a, T: ApiTransport> GuildFilter<'a, T> {
    /// Creates a filter over the given client and bot credential.
    ///
    /// `app_user_id` is the provider-side principal id of the
    /// application itself; `concurrency` bounds in-flight membership
    /// checks (clamped to at least 1).
    #[must_use]
    pub fn new(
        client: &'a ProviderClient<T>,
        credential: &'a BotCredential,
        app_user_id: &'a str,
        concurrency: usize,
        policy: MembershipFailurePolicy,
    ) -> Self {
        Self {
            client,
            credential,
            app_user_id,
            concurrency: concurrency.max(1),
            policy,
        }
    }

    /// Lists the user's guilds and filters them to the manageable set.
    ///
    /// # Errors
    ///
    /// [`FilterError::Listing`] if the guild listing fails. No partial
    /// list is ever returned. Membership-check failures follow
    /// [`MembershipFailurePolicy`].
    pub async fn manageable_guilds(&self, access_token: &str) -> Result<Vec<Guild>, FilterError> {
        let guilds = self
            .client
            .list_member_guilds(access_token)
            .await
            .map_err(FilterError::Listing)?;
        self.filter_manageable(guilds).await
    }

    /// Filters an already-fetched guild list.
    ///
    /// Output order matches the input order restricted to the
    /// surviving subset, regardless of membership-check completion
    /// order.
    ///
    /// # Errors
    ///
    /// [`FilterError::Membership`] only under
    /// [`MembershipFailurePolicy::AbortBatch`].
    pub async fn filter_manageable(&self, guilds: Vec<Guild>) -> Result<Vec<Guild>, FilterError> {
        let retained: Vec<Guild> = guilds.into_iter().filter(|g| g.is_manageable()).collect();

        // `buffered` yields results in the order the futures were
        // produced, so the stable-order guarantee is structural.
        let checks: Vec<(Guild, Result<MembershipCheck, ProviderError>)> = stream::iter(retained)
            .map(|guild| async move {
                let result = self
                    .client
                    .check_app_membership(self.credential, &guild.id, self.app_user_id)
                    .await;
                (guild, result)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut kept = Vec::with_capacity(checks.len());
        for (guild, result) in checks {
            match result {
                Ok(MembershipCheck::Member) => kept.push(guild),
                Ok(MembershipCheck::NotMember) => {
                    tracing::debug!(guild_id = %guild.id, "bot not installed, dropping guild");
                }
                Err(ProviderError::Transport(TransportError::Timeout)) => {
                    // Timeouts resolve like absence: drop the guild.
                    tracing::warn!(guild_id = %guild.id, "membership check timed out, dropping guild");
                }
                Err(err) => match self.policy {
                    MembershipFailurePolicy::DropGuild => {
                        tracing::warn!(
                            guild_id = %guild.id,
                            error = %err,
                            "membership check failed, dropping guild"
                        );
                    }
                    MembershipFailurePolicy::AbortBatch => {
                        return Err(FilterError::Membership {
                            guild_id: guild.id,
                            source: err,
                        });
                    }
                },
            }
        }
        Ok(kept)
    }
}
