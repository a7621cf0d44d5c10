//! Subcommand implementations.

mod login;
mod logout;
mod refresh;
mod request;
mod status;
mod watch;
mod whoami;

use anyhow::Result;
use clap::Subcommand;

use crate::cli::GlobalArgs;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session
    Login(login::LoginArgs),

    /// End the session and clear stored credentials
    Logout(logout::LogoutArgs),

    /// Display the logged in user
    Whoami(whoami::WhoamiArgs),

    /// Refresh the session tokens now
    Refresh(refresh::RefreshArgs),

    /// Show the session phase and token lifetimes
    Status(status::StatusArgs),

    /// Send a request through the authenticated pipeline
    Request(request::RequestArgs),

    /// Keep the session alive, refreshing tokens before they expire
    Watch(watch::WatchArgs),
}

pub async fn handle(command: Commands, global: &GlobalArgs) -> Result<()> {
    match command {
        Commands::Login(args) => login::run(args, global).await,
        Commands::Logout(args) => logout::run(args, global).await,
        Commands::Whoami(args) => whoami::run(args, global).await,
        Commands::Refresh(args) => refresh::run(args, global).await,
        Commands::Status(args) => status::run(args, global).await,
        Commands::Request(args) => request::run(args, global).await,
        Commands::Watch(args) => watch::run(args, global).await,
    }
}

/// Message shown when a command needs a session and there isn't one.
pub(crate) const NO_SESSION: &str = "No active session. Run 'warden login' first.";
