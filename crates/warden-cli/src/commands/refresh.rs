//! Refresh command implementation.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

use warden::RefreshOutcome;
use warden::clock;
use warden::error::SESSION_EXPIRED_MESSAGE;

use crate::cli::GlobalArgs;
use crate::commands::NO_SESSION;
use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = Context::open(global).await?;
    if !ctx.session.state().is_authenticated {
        bail!(NO_SESSION);
    }

    eprintln!("{}", "Refreshing session...".dimmed());

    match ctx.session.refresh().await {
        RefreshOutcome::Refreshed(tokens) => {
            output::success("Session refreshed");
            let remaining = clock::remaining_seconds(tokens.access_token.as_str());
            output::field("Access token expires in", &output::lifetime(remaining));
            Ok(())
        }
        RefreshOutcome::SessionExpired { reason } => {
            bail!("{} ({})", SESSION_EXPIRED_MESSAGE, reason)
        }
        RefreshOutcome::Superseded => bail!("Session changed during refresh"),
    }
}
