//! Dashboard state owned by the poller.

use crate::model::{InvitationLink, Role, Snowflake, User};
use admin_ox_common::{AdminRequestError, Value};
use std::sync::Arc;
use strum::Display;

/// A collection as last seen by the dashboard.
///
/// `loading` is only true while a first load runs with nothing to show yet.
/// Later refreshes keep `data` in place, so a failed poll leaves the
/// last-known records visible next to the error.
#[derive(Debug, Clone)]
pub struct Resource<T> {
    pub data: Vec<T>,
    pub loading: bool,
    pub error: Option<Arc<AdminRequestError>>,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

impl<T> Resource<T> {
    /// Enter a fetch. A first load starts from scratch; a refresh only clears
    /// the previous error.
    pub fn begin(&mut self, initial_load: bool) {
        if initial_load {
            self.data.clear();
            self.loading = true;
        }
        self.error = None;
    }

    pub fn succeed(&mut self, data: Vec<T>) {
        self.data = data;
        self.loading = false;
        self.error = None;
    }

    pub fn fail(&mut self, error: Arc<AdminRequestError>) {
        self.loading = false;
        self.error = Some(error);
    }
}

/// The two monitored services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Service {
    #[strum(to_string = "DB")]
    Database,
    #[strum(to_string = "Bot")]
    Bot,
}

impl Service {
    /// Fixed hint shown when there is no error to report.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Database => "Database server status",
            Self::Bot => "Discord bot status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum ServiceState {
    #[default]
    #[strum(to_string = "checking")]
    Checking,
    #[strum(to_string = "ok")]
    Ok,
    #[strum(to_string = "down")]
    Down,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceStatus {
    pub state: ServiceState,
    pub error: Option<Arc<AdminRequestError>>,
}

impl ServiceStatus {
    #[must_use]
    pub fn checking() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ok() -> Self {
        Self {
            state: ServiceState::Ok,
            error: None,
        }
    }

    #[must_use]
    pub fn down(error: Option<Arc<AdminRequestError>>) -> Self {
        Self {
            state: ServiceState::Down,
            error,
        }
    }

    /// Read a liveness payload: only `{"status": "ok"}` means up.
    #[must_use]
    pub fn from_payload(payload: Option<&Value>) -> Self {
        let healthy = payload
            .and_then(|p| p.get("status"))
            .and_then(Value::as_str)
            == Some("ok");
        if healthy { Self::ok() } else { Self::down(None) }
    }
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub db: ServiceStatus,
    pub bot: ServiceStatus,
    pub roles: Resource<Role>,
    pub users: Resource<User>,
    pub invitations: Resource<InvitationLink>,
}

impl DashboardState {
    #[must_use]
    pub fn service(&self, service: Service) -> &ServiceStatus {
        match service {
            Service::Database => &self.db,
            Service::Bot => &self.bot,
        }
    }

    pub fn service_mut(&mut self, service: Service) -> &mut ServiceStatus {
        match service {
            Service::Database => &mut self.db,
            Service::Bot => &mut self.bot,
        }
    }

    #[must_use]
    pub fn role(&self, id: &Snowflake) -> Option<&Role> {
        self.roles.data.iter().find(|role| &role.id == id)
    }

    /// Point the role at `code` locally. Returns false if the role is unknown.
    pub fn patch_role_invitation(&mut self, id: &Snowflake, code: &str) -> bool {
        match self.roles.data.iter_mut().find(|role| &role.id == id) {
            Some(role) => {
                role.invitation_link = Some(code.to_string());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn role(id: &str) -> Role {
        Role {
            id: id.into(),
            role_name: format!("role-{id}"),
            invitation_link: None,
        }
    }

    #[test]
    fn refresh_keeps_data_and_failure_keeps_it_too() {
        let mut roles = Resource::default();
        roles.begin(true);
        roles.succeed(vec![role("1")]);
        assert!(!roles.loading);

        roles.begin(false);
        assert_eq!(roles.data.len(), 1);

        roles.fail(Arc::new(AdminRequestError::Decode("bad".into())));
        assert_eq!(roles.data.len(), 1);
        assert!(roles.error.is_some());
        assert!(!roles.loading);

        roles.begin(false);
        assert!(roles.error.is_none());
    }

    #[test]
    fn first_load_starts_empty_and_loading() {
        let mut roles = Resource::default();
        roles.succeed(vec![role("1")]);
        roles.begin(true);
        assert!(roles.data.is_empty());
        assert!(roles.loading);
    }

    #[test]
    fn liveness_payload_interpretation() {
        assert_eq!(
            ServiceStatus::from_payload(Some(&json!({"status": "ok"}))).state,
            ServiceState::Ok
        );
        assert_eq!(
            ServiceStatus::from_payload(Some(&json!({"status": "degraded"}))).state,
            ServiceState::Down
        );
        assert_eq!(ServiceStatus::from_payload(Some(&json!("ok"))).state, ServiceState::Down);
        let absent = ServiceStatus::from_payload(None);
        assert_eq!(absent.state, ServiceState::Down);
        assert!(absent.error.is_none());
    }

    #[test]
    fn patch_touches_only_the_matching_role() {
        let mut state = DashboardState::default();
        state.roles.succeed(vec![role("1"), role("2")]);

        assert!(state.patch_role_invitation(&"2".into(), "abc"));
        assert_eq!(state.role(&"2".into()).and_then(|r| r.invitation_link.as_deref()), Some("abc"));
        assert_eq!(state.role(&"1".into()).and_then(|r| r.invitation_link.as_deref()), None);
        assert!(!state.patch_role_invitation(&"3".into(), "abc"));
    }
}
