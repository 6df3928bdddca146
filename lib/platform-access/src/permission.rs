//! Permission bitmask decoding for provider guilds.
//!
//! The provider reports a user's permissions in a guild as a decimal
//! string holding a 64-bit bitmask. The dashboard only cares about a
//! coarse capability: can this user operate the bot in the guild at all.

use crate::error::InvalidBitmaskError;
use serde::{Deserialize, Serialize};

/// Bit granting guild-management capability.
const MANAGE_GUILD_BIT: u64 = 0x20;

/// Bit granting full administrator capability.
const ADMINISTRATOR_BIT: u64 = 0x8;

/// Coarse-grained capability decoded from a permission bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionLevel {
    /// The manage-guild bit is set.
    Manage,
    /// The administrator bit is set (and manage-guild is not).
    Administrator,
    /// Neither relevant bit is set.
    None,
}

impl PermissionLevel {
    /// Decodes a decimal bitmask string into a permission level.
    ///
    /// The manage-guild bit is checked before the administrator bit.
    /// A mask with both bits set decodes to `Manage`: the narrower,
    /// more specific operational capability wins. This precedence is
    /// fixed and must not be reordered.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBitmaskError`] if the input is not a valid
    /// unsigned 64-bit decimal integer.
    pub fn decode(bitmask: &str) -> Result<Self, InvalidBitmaskError> {
        let mask: u64 = bitmask.trim().parse().map_err(|_| InvalidBitmaskError {
            raw: bitmask.to_string(),
        })?;

        if mask & MANAGE_GUILD_BIT != 0 {
            Ok(Self::Manage)
        } else if mask & ADMINISTRATOR_BIT != 0 {
            Ok(Self::Administrator)
        } else {
            Ok(Self::None)
        }
    }

    /// Decodes a bitmask, treating malformed input as no permission.
    ///
    /// Malformed permission data from the provider must never abort a
    /// batch filter; it is logged and resolved to `None`.
    #[must_use]
    pub fn decode_lossy(bitmask: &str) -> Self {
        match Self::decode(bitmask) {
            Ok(level) => level,
            Err(err) => {
                tracing::warn!(error = %err, "treating malformed bitmask as no permission");
                Self::None
            }
        }
    }

    /// Returns true if this level allows managing the bot in a guild.
    #[must_use]
    pub fn is_manageable(&self) -> bool {
        matches!(self, Self::Manage | Self::Administrator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_manage_bit() {
        assert_eq!(
            PermissionLevel::decode("32").expect("decode"),
            PermissionLevel::Manage
        );
    }

    #[test]
    fn decode_administrator_bit() {
        assert_eq!(
            PermissionLevel::decode("8").expect("decode"),
            PermissionLevel::Administrator
        );
    }

    #[test]
    fn decode_neither_bit() {
        assert_eq!(
            PermissionLevel::decode("0").expect("decode"),
            PermissionLevel::None
        );
        // Bits adjacent to the interesting ones do not leak through.
        assert_eq!(
            PermissionLevel::decode("16").expect("decode"),
            PermissionLevel::None
        );
    }

    #[test]
    fn both_bits_set_decodes_to_manage() {
        // 0x28 = manage-guild | administrator. Manage wins; the
        // precedence is part of the contract.
        assert_eq!(
            PermissionLevel::decode("40").expect("decode"),
            PermissionLevel::Manage
        );
    }

    #[test]
    fn decode_full_width_mask() {
        let all = u64::MAX.to_string();
        assert_eq!(
            PermissionLevel::decode(&all).expect("decode"),
            PermissionLevel::Manage
        );
    }

    #[test]
    fn decode_rejects_non_numeric() {
        let err = PermissionLevel::decode("ADMINISTRATOR").unwrap_err();
        assert_eq!(err.raw, "ADMINISTRATOR");
        assert!(PermissionLevel::decode("").is_err());
        assert!(PermissionLevel::decode("-8").is_err());
    }

    #[test]
    fn decode_lossy_defaults_to_none() {
        assert_eq!(
            PermissionLevel::decode_lossy("not-a-number"),
            PermissionLevel::None
        );
        assert_eq!(PermissionLevel::decode_lossy("40"), PermissionLevel::Manage);
    }

    #[test]
    fn is_manageable() {
        assert!(PermissionLevel::Manage.is_manageable());
        assert!(PermissionLevel::Administrator.is_manageable());
        assert!(!PermissionLevel::None.is_manageable());
    }

    #[test]
    fn serialization_labels() {
        assert_eq!(
            serde_json::to_string(&PermissionLevel::Manage).expect("serialize"),
            "\"MANAGE\""
        );
        assert_eq!(
            serde_json::to_string(&PermissionLevel::None).expect("serialize"),
            "\"NONE\""
        );
    }
}
