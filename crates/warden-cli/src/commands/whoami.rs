//! Whoami command implementation.

use anyhow::{Context as _, Result, bail};
use clap::Args;

use warden::clock;

use crate::cli::GlobalArgs;
use crate::commands::NO_SESSION;
use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Fetch the profile from the provider instead of the local cache
    #[arg(long)]
    pub remote: bool,

    /// Print the profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = Context::open(global).await?;
    let state = ctx.session.state();
    if !state.is_authenticated {
        bail!(NO_SESSION);
    }

    let user = if args.remote {
        ctx.session
            .fetch_profile()
            .await
            .context("Failed to fetch profile")?
    } else {
        state.user.context(NO_SESSION)?
    };

    if args.json {
        return output::json_pretty(&user);
    }

    output::field("ID", &user.id.to_string());
    output::field("Username", &user.username);
    output::field("Name", &user.name);
    output::field("Email", &user.email);
    if let Some(tokens) = state.tokens {
        let remaining = clock::remaining_seconds(tokens.access_token.as_str());
        output::field("Access token expires in", &output::lifetime(remaining));
    }

    Ok(())
}
