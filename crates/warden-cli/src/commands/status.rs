//! Status command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use warden::{SessionState, clock};

use crate::cli::GlobalArgs;
use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    phase: String,
    authenticated: bool,
    username: Option<String>,
    access_expires_in_secs: Option<u64>,
    refresh_expires_in_secs: Option<u64>,
    error: Option<String>,
}

impl From<&SessionState> for StatusReport {
    fn from(state: &SessionState) -> Self {
        let tokens = state.tokens.as_ref();
        Self {
            phase: state.phase.to_string(),
            authenticated: state.is_authenticated,
            username: state.user.as_ref().map(|u| u.username.clone()),
            access_expires_in_secs: tokens
                .map(|t| clock::remaining_seconds(t.access_token.as_str())),
            refresh_expires_in_secs: tokens
                .map(|t| clock::remaining_seconds(t.refresh_token.as_str())),
            error: state.error.clone(),
        }
    }
}

pub async fn run(args: StatusArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = Context::open(global).await?;
    let report = StatusReport::from(&ctx.session.state());

    if args.json {
        return output::json_pretty(&report);
    }

    output::field("Phase", &report.phase);
    if let Some(ref username) = report.username {
        output::field("User", username);
    }
    if let Some(secs) = report.access_expires_in_secs {
        output::field("Access token", &output::lifetime(secs));
    }
    if let Some(secs) = report.refresh_expires_in_secs {
        output::field("Refresh token", &output::lifetime(secs));
    }
    if let Some(ref error) = report.error {
        output::field("Error", error);
    }

    Ok(())
}
