use crate::model::{InvitationLink, Role, Snowflake, User};
use admin_ox_common::{
    AdminRequestError, CancellationToken, Endpoint, RequestBuilder, RequestConfig, Value,
    into_records,
};
use serde::de::DeserializeOwned;

const PING_PATH: &str = "ping";
const BOT_PING_PATH: &str = "bot-ping";
const ROLE_PATH: &str = "role";
const USER_PATH: &str = "user";
const INVITATION_PATH: &str = "invitation";

/// Endpoint helpers for the admin backend, built on the common request builder
pub(crate) struct AdminRequestHelper {
    request_builder: RequestBuilder,
    bot_request_builder: Option<RequestBuilder>,
    page: u32,
    page_size: u32,
}

impl AdminRequestHelper {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        bot_base_url: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Self {
        let user_agent = concat!("admin-ox/", env!("CARGO_PKG_VERSION"));
        let request_builder = RequestBuilder::new(
            client.clone(),
            RequestConfig::new(base_url).with_user_agent(user_agent),
        );
        let bot_request_builder = bot_base_url.map(|url| {
            RequestBuilder::new(client, RequestConfig::new(url).with_user_agent(user_agent))
        });

        Self {
            request_builder,
            bot_request_builder,
            page,
            page_size,
        }
    }

    /// Database-backed API liveness
    pub async fn ping(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, AdminRequestError> {
        self.request_builder
            .fetch_json(&Endpoint::new(PING_PATH), cancel)
            .await
    }

    /// Bot liveness; a dedicated bot base URL is asked on its own `/ping`.
    pub async fn bot_ping(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, AdminRequestError> {
        match self.bot_request_builder {
            Some(ref bot) => bot.fetch_json(&Endpoint::new(PING_PATH), cancel).await,
            None => {
                self.request_builder
                    .fetch_json(&Endpoint::new(BOT_PING_PATH), cancel)
                    .await
            }
        }
    }

    pub async fn list_roles(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Role>, AdminRequestError> {
        self.list(ROLE_PATH, cancel).await
    }

    pub async fn list_users(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<User>, AdminRequestError> {
        self.list(USER_PATH, cancel).await
    }

    pub async fn list_invitations(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<InvitationLink>, AdminRequestError> {
        self.list(INVITATION_PATH, cancel).await
    }

    /// `PUT /role/{roleId}/{invitationCode}`
    pub async fn associate_invitation(
        &self,
        role_id: &Snowflake,
        code: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, AdminRequestError> {
        let endpoint = Endpoint::from_segments([ROLE_PATH, role_id.as_str(), code]);
        self.request_builder.put_json(&endpoint, cancel).await
    }

    async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>, AdminRequestError> {
        let endpoint = Endpoint::new(path).paged(self.page, self.page_size);
        let payload = self.request_builder.fetch_json(&endpoint, cancel).await?;
        decode_records(path, payload)
    }
}

/// Flatten an envelope and decode each record.
pub(crate) fn decode_records<T: DeserializeOwned>(
    what: &str,
    payload: Option<Value>,
) -> Result<Vec<T>, AdminRequestError> {
    into_records(payload)
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value(record)
                .map_err(|e| AdminRequestError::Decode(format!("{what} record {index}: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::decode_records;
    use crate::model::Role;
    use serde_json::json;

    #[test]
    fn decodes_enveloped_records() {
        let payload = json!({
            "content": [
                {"id": "1448340203264803000", "roleName": "TestRole", "invitationLink": null},
                {"id": "1425124398456635400", "roleName": "Owner"}
            ],
            "totalElements": 2
        });
        let roles: Vec<Role> = decode_records("role", Some(payload)).expect("valid roles");
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[1].id, "1425124398456635400");
        assert_eq!(roles[1].invitation_link, None);
    }

    #[test]
    fn bad_record_names_its_position() {
        let payload = json!([{"id": "1", "roleName": "ok"}, {"id": "2"}]);
        let err = decode_records::<Role>("role", Some(payload)).expect_err("missing roleName");
        assert!(err.to_string().contains("role record 1"), "{err}");
    }

    #[test]
    fn absent_payload_is_empty_list() {
        let roles: Vec<Role> = decode_records("role", None).expect("absence is fine");
        assert!(roles.is_empty());
    }
}
