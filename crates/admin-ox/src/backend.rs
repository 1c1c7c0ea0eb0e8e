//! The seam between the poller and the network.

use crate::{
    BotAdmin,
    model::{InvitationLink, Role, Snowflake, User},
};
use admin_ox_common::{AdminRequestError, CancellationToken, Value, async_trait};

/// Everything the dashboard reads from and writes to the backend.
///
/// [`BotAdmin`] is the HTTP implementation; tests substitute scripted ones.
/// Every call takes the poller's cancellation token and must report an
/// abandoned request as [`AdminRequestError::Cancelled`].
#[async_trait]
pub trait Backend: Send + Sync {
    /// Database-backed API liveness payload.
    async fn ping(&self, cancel: &CancellationToken) -> Result<Option<Value>, AdminRequestError>;

    /// Bot liveness payload.
    async fn bot_ping(&self, cancel: &CancellationToken)
    -> Result<Option<Value>, AdminRequestError>;

    async fn list_roles(&self, cancel: &CancellationToken) -> Result<Vec<Role>, AdminRequestError>;

    async fn list_users(&self, cancel: &CancellationToken) -> Result<Vec<User>, AdminRequestError>;

    async fn list_invitations(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<InvitationLink>, AdminRequestError>;

    /// Associate `code` with the role.
    async fn associate_invitation(
        &self,
        role_id: &Snowflake,
        code: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, AdminRequestError>;
}

#[async_trait]
impl Backend for BotAdmin {
    async fn ping(&self, cancel: &CancellationToken) -> Result<Option<Value>, AdminRequestError> {
        BotAdmin::ping(self, cancel).await
    }

    async fn bot_ping(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, AdminRequestError> {
        BotAdmin::bot_ping(self, cancel).await
    }

    async fn list_roles(&self, cancel: &CancellationToken) -> Result<Vec<Role>, AdminRequestError> {
        BotAdmin::list_roles(self, cancel).await
    }

    async fn list_users(&self, cancel: &CancellationToken) -> Result<Vec<User>, AdminRequestError> {
        BotAdmin::list_users(self, cancel).await
    }

    async fn list_invitations(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<InvitationLink>, AdminRequestError> {
        BotAdmin::list_invitations(self, cancel).await
    }

    async fn associate_invitation(
        &self,
        role_id: &Snowflake,
        code: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, AdminRequestError> {
        BotAdmin::associate_invitation(self, role_id, code, cancel).await
    }
}
