//! Guild wire types.
//!
//! Guilds are transient: fetched per-request from the provider, never
//! persisted. The provider adds fields over time, so deserialization
//! must ignore anything unknown.

use guildgate_platform_access::PermissionLevel;
use serde::{Deserialize, Serialize};

/// A guild as the provider reports it for the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    /// Provider-side guild id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Icon reference, if the guild has one.
    #[serde(default)]
    pub icon: Option<String>,
    /// Whether the authenticated user owns the guild.
    #[serde(default)]
    pub owner: bool,
    /// Raw permission bitmask as a decimal string.
    #[serde(default)]
    pub permissions: String,
}

impl Guild {
    /// Decodes the permission bitmask, treating malformed data as no
    /// permission.
    #[must_use]
    pub fn permission_level(&self) -> PermissionLevel {
        PermissionLevel::decode_lossy(&self.permissions)
    }

    /// Returns true if the user can manage the bot here: owners bypass
    /// the bitmask entirely.
    #[must_use]
    pub fn is_manageable(&self) -> bool {
        self.owner || self.permission_level().is_manageable()
    }
}

/// A guild the dashboard exposes to the user, with the derived
/// permission label attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagedGuild {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub owner: bool,
    /// Derived capability label; never stored.
    pub permission: PermissionLevel,
}

impl From<Guild> for ManagedGuild {
    fn from(guild: Guild) -> Self {
        let permission = guild.permission_level();
        Self {
            id: guild.id,
            name: guild.name,
            icon: guild.icon,
            owner: guild.owner,
            permission,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialization_ignores_unknown_fields() {
        // Forward compatibility: the provider may add fields at will.
        let json = r#"{
            "id": "80351110224678912",
            "name": "1337 Krew",
            "icon": "8342729096ea3675442027381ff50dfe",
            "owner": true,
            "permissions": "36953089",
            "features": ["COMMUNITY", "NEWS"],
            "approximate_member_count": 425
        }"#;

        let guild: Guild = serde_json::from_str(json).expect("deserialize");
        assert_eq!(guild.id, "80351110224678912");
        assert!(guild.owner);
        assert_eq!(guild.permissions, "36953089");
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"{"id": "1", "name": "minimal"}"#;
        let guild: Guild = serde_json::from_str(json).expect("deserialize");
        assert!(guild.icon.is_none());
        assert!(!guild.owner);
        assert_eq!(guild.permissions, "");
        assert_eq!(guild.permission_level(), PermissionLevel::None);
    }

    #[test]
    fn owner_bypasses_bitmask() {
        let guild = Guild {
            id: "1".to_string(),
            name: "owned".to_string(),
            icon: None,
            owner: true,
            permissions: "0".to_string(),
        };
        assert!(guild.is_manageable());
        assert_eq!(guild.permission_level(), PermissionLevel::None);
    }

    #[test]
    fn manage_bit_makes_guild_manageable() {
        let guild = Guild {
            id: "2".to_string(),
            name: "managed".to_string(),
            icon: None,
            owner: false,
            permissions: "40".to_string(),
        };
        assert!(guild.is_manageable());
        assert_eq!(guild.permission_level(), PermissionLevel::Manage);
    }

    #[test]
    fn plain_member_guild_is_not_manageable() {
        let guild = Guild {
            id: "3".to_string(),
            name: "member".to_string(),
            icon: None,
            owner: false,
            permissions: "16".to_string(),
        };
        assert!(!guild.is_manageable());
    }

    #[test]
    fn managed_guild_carries_derived_permission() {
        let guild = Guild {
            id: "2".to_string(),
            name: "managed".to_string(),
            icon: Some("icon".to_string()),
            owner: false,
            permissions: "8".to_string(),
        };
        let managed = ManagedGuild::from(guild);
        assert_eq!(managed.permission, PermissionLevel::Administrator);
        let json = serde_json::to_string(&managed).expect("serialize");
        assert!(json.contains("\"ADMINISTRATOR\""));
    }
}
