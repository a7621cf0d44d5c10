//! Request command implementation.

use anyhow::{Context as _, Result, bail};
use clap::Args;

use warden::{ApiRequest, Method};

use crate::cli::GlobalArgs;
use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Path relative to the API URL, e.g. /auth/me
    pub path: String,

    /// HTTP method
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: Method,

    /// JSON request body
    #[arg(long, short = 'd')]
    pub data: Option<String>,
}

pub async fn run(args: RequestArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = Context::open(global).await?;

    let mut request = ApiRequest::new(args.method, &args.path);
    if let Some(ref data) = args.data {
        let body = serde_json::from_str(data).context("Request body is not valid JSON")?;
        request = request.with_body(body);
    }

    let response = ctx
        .api()
        .send(request)
        .await
        .with_context(|| format!("Request to {} failed", args.path))?;

    match serde_json::from_slice::<serde_json::Value>(&response.body) {
        Ok(json) => output::json_pretty(&json)?,
        Err(_) => println!("{}", response.text()),
    }

    if !response.is_success() {
        bail!("{} {} returned HTTP {}", args.method, args.path, response.status);
    }
    Ok(())
}
