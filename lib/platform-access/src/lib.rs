//! Platform access, authentication, and authorization for guildgate.
//!
//! This crate provides:
//! - Permission bitmask decoding (`PermissionLevel`)
//! - Post-login redirect validation (`AllowedRedirectSet`)
//! - Application token issuance and verification (`TokenIssuer`)
//! - Identity-provider profile extraction (`ProviderKind`)
//! - The login completion flow (`LoginCompletion`)
//!
//! # Trust Domains
//!
//! Three distinct credentials flow through this crate and must not be
//! confused:
//! - the end user's OAuth session with the provider,
//! - the application's own token-signing secret,
//! - the application's privileged bot credential (held by
//!   `guildgate-provider`).
//!
//! # Example
//!
//! ```
//! use guildgate_platform_access::{
//!     AllowedRedirectSet, AuthenticatedIdentity, LoginCompletion, ProviderKind, TokenIssuer,
//! };
//! use guildgate_core::UserId;
//!
//! let issuer = TokenIssuer::new("a-signing-secret", 3_600_000).unwrap();
//! let allowed =
//!     AllowedRedirectSet::from_uris(["https://app.example.com/home"]).unwrap();
//! let completion = LoginCompletion::new(&issuer, &allowed, "https://app.example.com/home");
//!
//! let identity = AuthenticatedIdentity {
//!     user_id: UserId::new(),
//!     provider: ProviderKind::Discord,
//!     subject: "190405607035".to_string(),
//! };
//!
//! let outcome = completion
//!     .complete(
//!         Some("https://app.example.com/finish?x=1"),
//!         &identity,
//!         chrono::Utc::now(),
//!         false,
//!     )
//!     .unwrap();
//! assert!(outcome.redirect.unwrap().contains("token="));
//! ```

pub mod completion;
pub mod error;
pub mod identity;
pub mod permission;
pub mod redirect;
pub mod token;

// Re-export main types at crate root
pub use completion::{CompletionError, CompletionOutcome, CompletionState, LoginCompletion};
pub use error::{ConfigurationError, IdentityError, InvalidBitmaskError, TokenError};
pub use identity::{AuthenticatedIdentity, ProviderKind, ProviderProfile};
pub use permission::PermissionLevel;
pub use redirect::AllowedRedirectSet;
pub use token::{AppClaims, AppToken, TokenIssuer};
