//! Login command implementation.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;

use warden::LoginCredentials;
use warden::clock;
use warden::credentials::DEFAULT_LOGIN_EXPIRES_IN_MINS;

use crate::cli::GlobalArgs;
use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account username
    #[arg(long)]
    pub username: String,

    /// Account password
    #[arg(long, env = "WARDEN_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Requested access token lifetime in minutes
    #[arg(long, default_value_t = DEFAULT_LOGIN_EXPIRES_IN_MINS)]
    pub expires_in_mins: u32,
}

pub async fn run(args: LoginArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = Context::open(global).await?;
    let credentials =
        LoginCredentials::new(&args.username, &args.password).expires_in_mins(args.expires_in_mins);

    eprintln!("{}", "Logging in...".dimmed());

    let user = ctx
        .session
        .login(credentials)
        .await
        .context("Failed to login")?;

    output::success(&format!("Logged in as {}", user.name));
    println!();
    output::field("ID", &user.id.to_string());
    output::field("Username", &user.username);
    output::field("Email", &user.email);
    if let Some(tokens) = ctx.session.state().tokens {
        let remaining = clock::remaining_seconds(tokens.access_token.as_str());
        output::field("Access token expires in", &output::lifetime(remaining));
    }

    Ok(())
}
