#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::missing_docs_in_private_items
)]

//! Client and polling dashboard for a chat bot's admin backend.
//!
//! [`BotAdmin`] talks to the backend, [`Poller`] keeps a live
//! [`DashboardState`] refreshed on a fixed cadence, and
//! [`AssociationForm`] drives the one write workflow: attaching an invitation
//! code to a role.

pub mod association;
pub mod backend;
mod internal;
pub mod model;
pub mod poller;
pub mod prelude;
pub mod render;
pub mod state;

// Re-export main types
pub use admin_ox_common::{AdminRequestError, CancellationToken, ErrorKind};
pub use association::{AssociationForm, AssociationStatus, derive_invite_code};
pub use backend::Backend;
pub use model::{InvitationLink, Role, Snowflake, User};
pub use poller::{Poller, PollerConfig, RefreshOutcome};
pub use state::{DashboardState, Resource, Service, ServiceState, ServiceStatus};

use admin_ox_common::Value;
use bon::Builder;
use core::fmt;

use crate::internal::AdminRequestHelper;

const BASE_URL: &str = "http://localhost:8080";
const DEFAULT_PAGE: u32 = 0;
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Environment variable holding the backend base URL.
pub const BASE_URL_ENV: &str = "ADMIN_API_BASE_URL";
/// Environment variable holding an optional separate bot base URL.
pub const BOT_BASE_URL_ENV: &str = "ADMIN_BOT_BASE_URL";

#[derive(Clone, Builder)]
pub struct BotAdmin {
    #[builder(default)]
    pub(crate) client: reqwest::Client,
    #[builder(default = BASE_URL.to_string(), into)]
    pub(crate) base_url: String,
    /// When set, bot liveness is read from `{bot_base_url}/ping` instead of
    /// `{base_url}/bot-ping`.
    #[builder(into)]
    pub(crate) bot_base_url: Option<String>,
    #[builder(default = DEFAULT_PAGE)]
    pub(crate) page: u32,
    #[builder(default = DEFAULT_PAGE_SIZE)]
    pub(crate) page_size: u32,
}

impl Default for BotAdmin {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl BotAdmin {
    /// Create a new client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::builder().base_url(base_url).build()
    }

    pub fn load_from_env() -> Result<Self, std::env::VarError> {
        let base_url = std::env::var(BASE_URL_ENV)?;
        let bot_base_url = std::env::var(BOT_BASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty());
        Ok(Self::builder()
            .base_url(base_url)
            .maybe_bot_base_url(bot_base_url)
            .build())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create request helper for internal use
    fn request_helper(&self) -> AdminRequestHelper {
        AdminRequestHelper::new(
            self.client.clone(),
            &self.base_url,
            self.bot_base_url.as_deref(),
            self.page,
            self.page_size,
        )
    }
}

impl BotAdmin {
    /// `GET /ping`: liveness of the database-backed API.
    pub async fn ping(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, AdminRequestError> {
        self.request_helper().ping(cancel).await
    }

    /// `GET /bot-ping`: liveness of the chat bot.
    pub async fn bot_ping(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, AdminRequestError> {
        self.request_helper().bot_ping(cancel).await
    }

    /// `GET /role?page=..&size=..`
    pub async fn list_roles(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Role>, AdminRequestError> {
        self.request_helper().list_roles(cancel).await
    }

    /// `GET /user?page=..&size=..`
    pub async fn list_users(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<User>, AdminRequestError> {
        self.request_helper().list_users(cancel).await
    }

    /// `GET /invitation?page=..&size=..`
    pub async fn list_invitations(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<InvitationLink>, AdminRequestError> {
        self.request_helper().list_invitations(cancel).await
    }

    /// `PUT /role/{roleId}/{invitationCode}`: associate an invite code with a
    /// role. Returns whatever the backend echoes, usually the updated role.
    pub async fn associate_invitation(
        &self,
        role_id: &Snowflake,
        code: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, AdminRequestError> {
        self.request_helper()
            .associate_invitation(role_id, code, cancel)
            .await
    }
}

impl fmt::Debug for BotAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotAdmin")
            .field("client", &self.client)
            .field("base_url", &self.base_url)
            .field("bot_base_url", &self.bot_base_url)
            .field("page", &self.page)
            .field("page_size", &self.page_size)
            .finish()
    }
}
