use super::{Role, Snowflake};
use admin_ox_common::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};

/// A guild member known to the bot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user's snowflake id.
    pub id: Snowflake,
    /// The user's name.
    pub username: String,
    /// When the user joined the guild; empty when the backend has no date.
    #[serde(default)]
    pub joined_date: Timestamp,
    /// Roles the user currently holds.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub roles: Vec<Role>,
}

/// `null` and a missing field both mean no roles.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Role>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_roles_and_date_are_tolerated() {
        let user: User = serde_json::from_str(
            r#"{"id": "1", "username": "ghost", "joinedDate": null, "roles": null}"#,
        )
        .expect("nulls are tolerated");
        assert!(user.roles.is_empty());
        assert!(user.joined_date.is_empty());

        let bare: User = serde_json::from_str(r#"{"id": "2", "username": "bare"}"#)
            .expect("missing fields are tolerated");
        assert!(bare.roles.is_empty());
        assert!(bare.joined_date.is_empty());
    }
}
