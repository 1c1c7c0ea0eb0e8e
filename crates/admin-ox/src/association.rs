//! Attaching an invitation code to a role.

use crate::{
    backend::Backend,
    model::{InvitationLink, Role, Snowflake},
    poller::Poller,
};
use url::Url;

/// Host/path prefixes of invite URLs written without a scheme.
const INVITE_PREFIXES: [&str; 3] = ["discord.gg/", "discord.com/invite/", "discordapp.com/invite/"];

/// Extract the invite code from a bare code or an invite URL.
///
/// Full `http(s)` URLs yield their last non-empty path segment. Otherwise a
/// known invite prefix is stripped, query and fragment are dropped, and the
/// final path segment is taken. Blank input gives an empty string.
///
/// ```
/// use admin_ox::derive_invite_code;
///
/// assert_eq!(derive_invite_code("https://discord.gg/R778zuxUht"), "R778zuxUht");
/// assert_eq!(derive_invite_code("https://discord.com/invite/R778zuxUht?x=1"), "R778zuxUht");
/// assert_eq!(derive_invite_code("R778zuxUht"), "R778zuxUht");
/// assert_eq!(derive_invite_code("   "), "");
/// ```
#[must_use]
pub fn derive_invite_code(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if looks_like_url(trimmed) {
        return Url::parse(trimmed)
            .ok()
            .and_then(|url| last_url_segment(&url))
            .unwrap_or_else(|| trimmed.to_string());
    }

    let without_www = strip_prefix_ignore_case(trimmed, "www.").unwrap_or(trimmed);
    let rest = INVITE_PREFIXES
        .iter()
        .find_map(|prefix| strip_prefix_ignore_case(without_www, prefix))
        .unwrap_or(trimmed);

    let path = rest.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map_or_else(|| trimmed.to_string(), str::to_string)
}

fn looks_like_url(text: &str) -> bool {
    strip_prefix_ignore_case(text, "https://").is_some()
        || strip_prefix_ignore_case(text, "http://").is_some()
}

fn last_url_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .rev()
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

/// Progress of the association write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssociationStatus {
    #[default]
    Idle,
    Saving,
    Saved { role_id: Snowflake, code: String },
    Failed(String),
}

/// Transient selection state of the association form.
#[derive(Debug, Clone, Default)]
pub struct AssociationForm {
    selected_role_id: Option<Snowflake>,
    selected_invite_link: Option<String>,
    status: AssociationStatus,
}

impl AssociationForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_role_id(&self) -> Option<&Snowflake> {
        self.selected_role_id.as_ref()
    }

    pub fn selected_invite_link(&self) -> Option<&str> {
        self.selected_invite_link.as_deref()
    }

    pub fn status(&self) -> &AssociationStatus {
        &self.status
    }

    pub fn select_role(&mut self, role_id: Option<Snowflake>) {
        if self.selected_role_id != role_id {
            self.selected_role_id = role_id;
            self.settle_status();
        }
    }

    pub fn select_invite_link(&mut self, link: Option<String>) {
        if self.selected_invite_link != link {
            self.selected_invite_link = link;
            self.settle_status();
        }
    }

    /// The code that would be written, or `""` when nothing usable is selected.
    #[must_use]
    pub fn derived_code(&self) -> String {
        self.selected_invite_link
            .as_deref()
            .map(derive_invite_code)
            .unwrap_or_default()
    }

    /// Confirm needs a role, a non-empty code, and no write in flight.
    #[must_use]
    pub fn can_confirm(&self) -> bool {
        self.selected_role_id.is_some()
            && !self.derived_code().is_empty()
            && self.status != AssociationStatus::Saving
    }

    /// Drop selections that no longer exist in the collections.
    ///
    /// Call after every state change. Returns true if anything was cleared.
    pub fn reconcile(&mut self, roles: &[Role], invitations: &[InvitationLink]) -> bool {
        let role_gone = self
            .selected_role_id
            .as_ref()
            .is_some_and(|id| !roles.iter().any(|role| &role.id == id));
        let link_gone = self.selected_invite_link.as_deref().is_some_and(|link| {
            !invitations
                .iter()
                .any(|invite| invite.invitation_link == link)
        });

        if role_gone {
            self.selected_role_id = None;
        }
        if link_gone {
            self.selected_invite_link = None;
        }
        if role_gone || link_gone {
            self.settle_status();
        }
        role_gone || link_gone
    }

    /// Write the association and patch the poller's roles on success.
    ///
    /// Does nothing when [`AssociationForm::can_confirm`] is false. On failure
    /// the message lands in [`AssociationStatus::Failed`] and the selections
    /// are kept.
    pub async fn confirm<B: Backend + 'static>(
        &mut self,
        poller: &Poller<B>,
    ) -> &AssociationStatus {
        if !self.can_confirm() {
            log::debug!("association not ready, ignoring confirm");
            return &self.status;
        }
        let Some(role_id) = self.selected_role_id.clone() else {
            return &self.status;
        };
        let code = self.derived_code();

        self.status = AssociationStatus::Saving;
        self.status = match poller.associate_invitation(&role_id, &code).await {
            Ok(()) => AssociationStatus::Saved { role_id, code },
            Err(e) => {
                log::warn!("failed to associate invite {code} with role {role_id}: {e}");
                AssociationStatus::Failed(e.to_string())
            }
        };
        &self.status
    }

    /// A finished save stops being news once the selection changes.
    fn settle_status(&mut self) {
        if self.status != AssociationStatus::Saving {
            self.status = AssociationStatus::Idle;
        }
    }
}
