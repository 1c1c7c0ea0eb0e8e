//! Periodic refresh of the dashboard state.
//!
//! A [`Poller`] owns one [`DashboardState`], published through a
//! [`tokio::sync::watch`] channel. [`Poller::start`] runs a first load of all
//! five resources and then refreshes them every [`PollerConfig::interval`].
//! A tick that arrives while the previous cycle is still running is dropped,
//! so at most one cycle is ever in flight. [`Poller::stop`] cancels the shared
//! token; outstanding requests resolve as cancelled and no state changes after
//! that point.
//!
//! A successful association patches the local roles right away. A roles list
//! that was requested before that write may still arrive afterwards; the patch
//! is reapplied on top of it until a roles fetch issued after the write lands.

use crate::{
    backend::Backend,
    model::Snowflake,
    state::{DashboardState, Resource, Service, ServiceStatus},
};
use admin_ox_common::{AdminRequestError, CancellationToken};
use bon::Builder;
use std::{
    future::Future,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

/// Refresh cadence of the dashboard.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone, Builder)]
pub struct PollerConfig {
    #[builder(default = DEFAULT_INTERVAL)]
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// What a call to [`Poller::refresh`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// All five fetches ran to completion (successfully or not).
    Completed,
    /// Another cycle was in flight, or the poller is stopped; nothing was fetched.
    Skipped,
}

/// Owns the dashboard state and keeps it fresh.
pub struct Poller<B> {
    shared: Arc<Shared<B>>,
    task: Option<JoinHandle<()>>,
}

/// State shared between the poller handle and its background task.
struct Shared<B> {
    backend: B,
    state: watch::Sender<DashboardState>,
    cancel: CancellationToken,
    refresh_in_flight: AtomicBool,
    associations: Mutex<Associations>,
    config: PollerConfig,
}

/// Role patches that no roles fetch has confirmed yet.
#[derive(Debug, Default)]
struct Associations {
    /// Bumped on every successful write.
    seq: u64,
    pending: Vec<(u64, Snowflake, String)>,
}

/// Clears the in-flight flag when a cycle ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<B: Backend + 'static> Poller<B> {
    pub fn new(backend: B, config: PollerConfig) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            shared: Arc::new(Shared {
                backend,
                state,
                cancel: CancellationToken::new(),
                refresh_in_flight: AtomicBool::new(false),
                associations: Mutex::default(),
                config,
            }),
            task: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.shared.backend
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.shared.state.subscribe()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> DashboardState {
        self.shared.state.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some() && !self.shared.cancel.is_cancelled()
    }

    /// Begin polling: a first load right away, then one refresh per interval.
    ///
    /// Must be called from within a tokio runtime. Calling it twice, or after
    /// [`Poller::stop`], does nothing.
    pub fn start(&mut self) {
        if self.task.is_some() || self.shared.cancel.is_cancelled() {
            log::debug!("poller already started or stopped");
            return;
        }

        log::info!(
            "starting dashboard poller, interval {:?}",
            self.shared.config.interval
        );
        let shared = Arc::clone(&self.shared);
        self.task = Some(tokio::spawn(shared.run()));
    }

    /// Stop polling and cancel every outstanding request.
    ///
    /// Once this returns, the state no longer changes.
    pub async fn stop(&mut self) {
        self.shared.cancel.cancel();
        // Wait out a mutation that may have passed its cancellation check.
        self.shared.state.send_if_modified(|_| false);

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::warn!("poller task ended abnormally: {e}");
            }
        }
        log::info!("dashboard poller stopped");
    }

    /// Run one refresh cycle now.
    ///
    /// `initial_load` resets every resource to its loading state first, as on
    /// mount. Returns [`RefreshOutcome::Skipped`] without fetching anything if
    /// a cycle is already running.
    pub async fn refresh(&self, initial_load: bool) -> RefreshOutcome {
        self.shared.refresh_all(initial_load).await
    }

    /// Associate `code` with the role, then patch the local roles collection
    /// without re-fetching it. On failure nothing local changes.
    pub async fn associate_invitation(
        &self,
        role_id: &Snowflake,
        code: &str,
    ) -> Result<(), AdminRequestError> {
        let shared = &self.shared;
        shared
            .backend
            .associate_invitation(role_id, code, &shared.cancel)
            .await?;

        log::info!("role {role_id} now uses invite {code}");
        shared.mutate(|state| {
            let mut associations = shared.associations();
            associations.seq += 1;
            let seq = associations.seq;
            associations
                .pending
                .push((seq, role_id.clone(), code.to_string()));

            if !state.patch_role_invitation(role_id, code) {
                log::debug!("role {role_id} is not in the local roles collection");
            }
        });
        Ok(())
    }
}

impl<B> Drop for Poller<B> {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<B: Backend + 'static> Shared<B> {
    async fn run(self: Arc<Self>) {
        tokio::spawn(Arc::clone(&self).cycle(true));

        // tokio rejects a zero period
        let period = self.config.interval.max(Duration::from_millis(1));
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    tokio::spawn(Arc::clone(&self).cycle(false));
                }
            }
        }
    }

    async fn cycle(self: Arc<Self>, initial_load: bool) {
        self.refresh_all(initial_load).await;
    }

    async fn refresh_all(&self, initial_load: bool) -> RefreshOutcome {
        if self.cancel.is_cancelled() {
            return RefreshOutcome::Skipped;
        }
        if self
            .refresh_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("previous refresh still in flight, skipping tick");
            return RefreshOutcome::Skipped;
        }
        let _in_flight = InFlight(&self.refresh_in_flight);

        log::debug!("refreshing dashboard (initial_load: {initial_load})");
        let roles_seen = self.associations().seq;
        tokio::join!(
            self.load_status(Service::Database, initial_load),
            self.load_status(Service::Bot, initial_load),
            self.load_list(
                "invitation links",
                initial_load,
                self.backend.list_invitations(&self.cancel),
                |state| &mut state.invitations,
                |_| {},
            ),
            self.load_list(
                "roles",
                initial_load,
                self.backend.list_roles(&self.cancel),
                |state| &mut state.roles,
                |state| self.reapply_associations(roles_seen, state),
            ),
            self.load_list(
                "users",
                initial_load,
                self.backend.list_users(&self.cancel),
                |state| &mut state.users,
                |_| {},
            ),
        );

        RefreshOutcome::Completed
    }

    async fn load_status(&self, service: Service, initial_load: bool) {
        if initial_load {
            self.mutate(|state| *state.service_mut(service) = ServiceStatus::checking());
        }

        let result = match service {
            Service::Database => self.backend.ping(&self.cancel).await,
            Service::Bot => self.backend.bot_ping(&self.cancel).await,
        };

        let status = match result {
            Ok(payload) => ServiceStatus::from_payload(payload.as_ref()),
            Err(e) if e.is_cancelled() => return,
            Err(e) => {
                log::warn!("{service} status check failed: {e}");
                ServiceStatus::down(Some(Arc::new(e)))
            }
        };
        self.mutate(|state| *state.service_mut(service) = status);
    }

    async fn load_list<T>(
        &self,
        name: &str,
        initial_load: bool,
        fetch: impl Future<Output = Result<Vec<T>, AdminRequestError>>,
        slot: fn(&mut DashboardState) -> &mut Resource<T>,
        after_success: impl FnOnce(&mut DashboardState),
    ) {
        self.mutate(|state| slot(state).begin(initial_load));

        match fetch.await {
            Ok(data) => {
                log::debug!("loaded {} {name}", data.len());
                self.mutate(|state| {
                    slot(state).succeed(data);
                    after_success(state);
                });
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                log::warn!("failed to load {name}: {e}");
                let error = Arc::new(e);
                self.mutate(|state| slot(state).fail(error));
            }
        }
    }

    /// Drop patches the fetch already reflects and put the rest back on top.
    ///
    /// `seen` is the write sequence observed before the roles request went out.
    fn reapply_associations(&self, seen: u64, state: &mut DashboardState) {
        let mut associations = self.associations();
        associations.pending.retain(|(seq, _, _)| *seq > seen);
        for (_, role_id, code) in &associations.pending {
            log::debug!("reapplying invite {code} to role {role_id} over a stale roles list");
            state.patch_role_invitation(role_id, code);
        }
    }

    fn associations(&self) -> MutexGuard<'_, Associations> {
        self.associations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` unless the poller has been stopped.
    fn mutate(&self, f: impl FnOnce(&mut DashboardState)) -> bool {
        self.state.send_if_modified(|state| {
            if self.cancel.is_cancelled() {
                return false;
            }
            f(state);
            true
        })
    }
}
