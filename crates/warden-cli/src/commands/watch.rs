//! Watch command implementation.

use std::time::Duration;

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use tracing::info;

use warden::{SessionConfig, clock};

use crate::cli::GlobalArgs;
use crate::commands::NO_SESSION;
use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between expiry checks
    #[arg(long, default_value_t = 60)]
    pub interval_secs: u64,

    /// Refresh when the access token has fewer than this many minutes left
    #[arg(long, default_value_t = 2)]
    pub threshold_mins: u32,

    /// Stop after this many checks (runs until interrupted by default)
    #[arg(long)]
    pub ticks: Option<u32>,
}

pub async fn run(args: WatchArgs, global: &GlobalArgs) -> Result<()> {
    let period = Duration::from_secs(args.interval_secs.max(1));
    let config = SessionConfig::default()
        .poll_interval(period)
        .refresh_threshold_mins(args.threshold_mins)
        .sync_profile(false);
    let ctx = Context::open_with(global, config).await?;
    if !ctx.session.state().is_authenticated {
        bail!(NO_SESSION);
    }

    let banner = format!(
        "Watching session, checking every {}s (Ctrl+C to stop)",
        period.as_secs()
    );
    eprintln!("{}", banner.as_str().dimmed());

    let mut updates = ctx.session.subscribe();
    let mut ticker = tokio::time::interval(period);
    let mut ticks = 0u32;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let state = ctx.session.state();
                if let Some(tokens) = state.tokens {
                    let remaining = clock::remaining_seconds(tokens.access_token.as_str());
                    output::field("Access token expires in", &output::lifetime(remaining));
                }
                ticks += 1;
                if args.ticks.is_some_and(|limit| ticks >= limit) {
                    break;
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if !state.is_authenticated {
                    ctx.session.shutdown();
                    bail!(state.error.unwrap_or_else(|| "Session ended".to_string()));
                }
                if !state.is_refreshing {
                    info!(phase = %state.phase, "Session updated");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                eprintln!();
                break;
            }
        }
    }

    ctx.session.shutdown();
    output::success("Stopped watching");
    Ok(())
}
