use super::Snowflake;
use serde::{Deserialize, Serialize};

/// A guild role managed by the bot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// The role's snowflake id.
    pub id: Snowflake,
    /// Display name of the role.
    pub role_name: String,
    /// Invitation code that grants this role, if one is associated.
    #[serde(default)]
    pub invitation_link: Option<String>,
}

impl Role {
    /// True when an invitation code is associated with the role.
    #[must_use]
    pub fn has_invitation(&self) -> bool {
        self.invitation_link
            .as_deref()
            .is_some_and(|link| !link.is_empty())
    }
}
