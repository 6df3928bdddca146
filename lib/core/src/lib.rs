//! Core domain types and utilities for the guildgate platform.
//!
//! This crate provides the foundational types and error handling used
//! throughout the guildgate bot-dashboard backend.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::UserId;
