//! Terminal front end for the bot admin dashboard.
//!
//! Usage:
//! ```bash
//! # Live dashboard, redrawn on every change until Ctrl-C
//! ADMIN_API_BASE_URL=http://localhost:8080 admin-ox watch
//!
//! # Load once and print
//! admin-ox --base-url http://localhost:8080 snapshot
//!
//! # Attach an invitation to a role
//! admin-ox associate --role 1425124398456635400 --invite https://discord.gg/R778zuxUht
//! ```
//!
//! Set `RUST_LOG=admin_ox=debug` to see request logs.

use admin_ox::{BASE_URL_ENV, BOT_BASE_URL_ENV, prelude::*, render::render_association};
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::time::Duration;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Parser)]
#[command(name = "admin-ox", version)]
#[command(about = "Single-server administrator interface for a Discord bot")]
struct Args {
    /// Backend base URL
    #[arg(long, env = BASE_URL_ENV, default_value = "http://localhost:8080")]
    base_url: String,

    /// Separate bot base URL, asked on its own `/ping`
    #[arg(long, env = BOT_BASE_URL_ENV)]
    bot_base_url: Option<String>,

    /// Poll interval in milliseconds
    #[arg(long, default_value_t = 5_000, value_parser = clap::value_parser!(u64).range(1..))]
    interval_ms: u64,

    /// Page requested from every list endpoint
    #[arg(long, default_value_t = 0)]
    page: u32,

    /// Page size requested from every list endpoint
    #[arg(long, default_value_t = 20)]
    page_size: u32,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Poll and redraw the dashboard until interrupted (default)
    Watch,
    /// Load everything once, print the dashboard and exit
    Snapshot,
    /// Associate an invitation code with a role
    Associate {
        /// Role id
        #[arg(long)]
        role: String,
        /// Invitation link or bare code, as listed by the backend
        #[arg(long)]
        invite: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let client = BotAdmin::builder()
        .base_url(args.base_url)
        .maybe_bot_base_url(args.bot_base_url.filter(|url| !url.trim().is_empty()))
        .page(args.page)
        .page_size(args.page_size)
        .build();
    log::debug!("using {client:?}");

    let config = PollerConfig::builder()
        .interval(Duration::from_millis(args.interval_ms))
        .build();
    let mut poller = Poller::new(client, config);

    let result = match args.command.unwrap_or(Command::Watch) {
        Command::Watch => watch(&mut poller).await,
        Command::Snapshot => {
            poller.refresh(true).await;
            print!("{}", render_dashboard(&poller.snapshot(), None));
            Ok(())
        }
        Command::Associate { role, invite } => associate(&poller, role, &invite).await,
    };

    poller.stop().await;
    result
}

async fn watch(poller: &mut Poller<BotAdmin>) -> anyhow::Result<()> {
    let mut updates = poller.subscribe();
    poller.start();

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                log::info!("interrupted, shutting down");
                return Ok(());
            }
            changed = updates.changed() => {
                changed.context("dashboard state closed")?;
                let frame = render_dashboard(&updates.borrow_and_update(), None);
                print!("{CLEAR_SCREEN}{frame}");
            }
        }
    }
}

async fn associate(poller: &Poller<BotAdmin>, role: String, invite: &str) -> anyhow::Result<()> {
    poller.refresh(true).await;
    let state = poller.snapshot();
    if let Some(error) = &state.roles.error {
        bail!("failed to load roles: {error}");
    }
    if let Some(error) = &state.invitations.error {
        bail!("failed to load invitation links: {error}");
    }

    let wanted = derive_invite_code(invite);
    let link = state
        .invitations
        .data
        .iter()
        .find(|i| i.invitation_link == invite || i.code() == wanted)
        .map(|i| i.invitation_link.clone())
        .with_context(|| format!("no invitation link matches {invite:?}"))?;

    let mut form = AssociationForm::new();
    form.select_role(Some(Snowflake::from(role.as_str())));
    form.select_invite_link(Some(link));
    form.reconcile(&state.roles.data, &state.invitations.data);
    if form.selected_role_id().is_none() {
        bail!("role {role} not found");
    }

    if let AssociationStatus::Failed(message) = form.confirm(poller).await {
        bail!("association failed: {message}");
    }
    print!("{}", render_association(&form));
    Ok(())
}
