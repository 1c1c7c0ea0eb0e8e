//! Common imports for working with the admin dashboard.
//!
//! ```rust,no_run
//! use admin_ox::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut poller = Poller::new(BotAdmin::load_from_env()?, PollerConfig::default());
//! poller.start();
//!
//! let mut updates = poller.subscribe();
//! updates.changed().await?;
//! println!("{}", render_dashboard(&updates.borrow(), None));
//!
//! poller.stop().await;
//! # Ok(())
//! # }
//! ```

pub use crate::{
    AdminRequestError, AssociationForm, AssociationStatus, Backend, BotAdmin, CancellationToken,
    DashboardState, InvitationLink, Poller, PollerConfig, RefreshOutcome, Resource, Role,
    Service, ServiceState, ServiceStatus, Snowflake, User, derive_invite_code,
    render::render_dashboard,
};
