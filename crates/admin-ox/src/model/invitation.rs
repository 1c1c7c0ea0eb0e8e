use super::Snowflake;
use serde::{Deserialize, Serialize};

/// An invitation link tracked by the bot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InvitationLink {
    /// The invitation's id.
    pub id: Snowflake,
    /// Either a bare invite code or a full invite URL.
    pub invitation_link: String,
}

impl InvitationLink {
    /// The invite code carried by this link.
    #[must_use]
    pub fn code(&self) -> String {
        crate::association::derive_invite_code(&self.invitation_link)
    }
}
