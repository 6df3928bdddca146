//! Provider API access for the guildgate platform.
//!
//! This crate provides:
//!
//! - **`ApiTransport` trait**: injected HTTP capability so control flow
//!   and decision logic can be tested without a live network
//! - **`ProviderClient`**: the provider's guild and profile endpoints
//! - **`GuildFilter`**: narrows a user's guild list to the guilds they
//!   can administer and where the bot is actually installed

pub mod client;
pub mod credential;
pub mod error;
pub mod filter;
pub mod guild;
pub mod transport;

pub use client::{MembershipCheck, ProviderClient};
pub use credential::BotCredential;
pub use error::{FilterError, ProviderError};
pub use filter::{GuildFilter, MembershipFailurePolicy};
pub use guild::{Guild, ManagedGuild};
pub use transport::{ApiResponse, ApiTransport, HttpTransport, TransportError};
