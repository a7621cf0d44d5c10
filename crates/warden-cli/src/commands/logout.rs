//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use crate::cli::GlobalArgs;
use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = Context::open(global).await?;

    let (_, warning) = ctx.session.logout().await.into_parts();
    if let Some(warning) = warning {
        output::warning(&format!("Logout was not confirmed remotely: {}", warning));
    }

    output::success("Logged out");
    Ok(())
}
