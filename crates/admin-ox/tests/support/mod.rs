#![allow(dead_code)]

use admin_ox::{
    AdminRequestError, Backend, CancellationToken, InvitationLink, Role, Snowflake, User,
};
use admin_ox_common::{Timestamp, Value, async_trait};
use serde_json::json;
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

/// A scripted answer: data, or a failure with the given HTTP status.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Data(T),
    Fail(u16),
}

impl<T> Reply<T> {
    fn into_result(self) -> Result<T, AdminRequestError> {
        match self {
            Self::Data(data) => Ok(data),
            Self::Fail(status) => {
                let code = reqwest::StatusCode::from_u16(status).expect("valid status code");
                Err(AdminRequestError::Status {
                    status,
                    status_text: code.canonical_reason().unwrap_or_default().to_string(),
                    body: String::new(),
                })
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Script {
    pub ping: Reply<Value>,
    pub bot_ping: Reply<Value>,
    pub roles: Reply<Vec<Role>>,
    pub users: Reply<Vec<User>>,
    pub invitations: Reply<Vec<InvitationLink>>,
    pub associate: Reply<()>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            ping: Reply::Data(json!({"status": "ok"})),
            bot_ping: Reply::Data(json!({"status": "ok"})),
            roles: Reply::Data(vec![
                role("1448340203264803000", "TestRole"),
                role("1425124398456635400", "Owner"),
            ]),
            users: Reply::Data(vec![user("283189354157965300", "tombartos")]),
            invitations: Reply::Data(vec![InvitationLink {
                id: "1".into(),
                invitation_link: "R778zuxUht".into(),
            }]),
            associate: Reply::Data(()),
        }
    }
}

pub fn role(id: &str, name: &str) -> Role {
    Role {
        id: id.into(),
        role_name: name.into(),
        invitation_link: None,
    }
}

pub fn user(id: &str, name: &str) -> User {
    User {
        id: id.into(),
        username: name.into(),
        joined_date: Timestamp::parse("2025-10-03T08:34:17.163"),
        roles: vec![role("1425124398456635400", "Owner")],
    }
}

/// In-memory backend that counts calls and can hold requests open.
#[derive(Debug, Default)]
pub struct FakeBackend {
    script: Mutex<Script>,
    reads: AtomicUsize,
    writes: Mutex<Vec<(Snowflake, String)>>,
    /// While set and not cancelled, every read waits for it.
    gate: Mutex<Option<CancellationToken>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose reads block until the returned token is cancelled.
    pub fn gated() -> (Self, CancellationToken) {
        let backend = Self::default();
        let gate = backend.hold();
        (backend, gate)
    }

    /// Block reads from now on until the returned token is cancelled.
    pub fn hold(&self) -> CancellationToken {
        let gate = CancellationToken::new();
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn script(&self, edit: impl FnOnce(&mut Script)) {
        edit(&mut self.script.lock().unwrap());
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<(Snowflake, String)> {
        self.writes.lock().unwrap().clone()
    }

    async fn read(&self, cancel: &CancellationToken) -> Result<Script, AdminRequestError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if cancel.is_cancelled() {
            return Err(AdminRequestError::Cancelled);
        }
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            tokio::select! {
                () = gate.cancelled() => {}
                () = cancel.cancelled() => return Err(AdminRequestError::Cancelled),
            }
        }
        Ok(self.script.lock().unwrap().clone())
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn ping(&self, cancel: &CancellationToken) -> Result<Option<Value>, AdminRequestError> {
        self.read(cancel).await?.ping.into_result().map(Some)
    }

    async fn bot_ping(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, AdminRequestError> {
        self.read(cancel).await?.bot_ping.into_result().map(Some)
    }

    async fn list_roles(&self, cancel: &CancellationToken) -> Result<Vec<Role>, AdminRequestError> {
        self.read(cancel).await?.roles.into_result()
    }

    async fn list_users(&self, cancel: &CancellationToken) -> Result<Vec<User>, AdminRequestError> {
        self.read(cancel).await?.users.into_result()
    }

    async fn list_invitations(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<InvitationLink>, AdminRequestError> {
        self.read(cancel).await?.invitations.into_result()
    }

    async fn associate_invitation(
        &self,
        role_id: &Snowflake,
        code: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, AdminRequestError> {
        if cancel.is_cancelled() {
            return Err(AdminRequestError::Cancelled);
        }
        let script = self.script.lock().unwrap().clone();
        self.writes
            .lock()
            .unwrap()
            .push((role_id.clone(), code.to_string()));
        script.associate.into_result().map(|()| None)
    }
}

/// Let spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
