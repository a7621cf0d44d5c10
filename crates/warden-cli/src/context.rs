//! Wiring from command line options to a live session.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use tracing::debug;

use warden::{ApiUrl, AuthInterceptor, Session, SessionConfig};
use warden_file::FileCredentialStore;
use warden_http::{HttpClient, HttpExecutor, HttpIdentityProvider};

use crate::cli::GlobalArgs;

/// A restored session plus the HTTP client it talks through.
pub struct Context {
    pub session: Session,
    client: HttpClient,
}

impl Context {
    /// Build a session for one-shot commands: no background poller and no
    /// profile sync, since the process exits as soon as the command is done.
    pub async fn open(global: &GlobalArgs) -> Result<Self> {
        let config = SessionConfig::default()
            .auto_refresh(false)
            .sync_profile(false);
        Self::open_with(global, config).await
    }

    pub async fn open_with(global: &GlobalArgs, config: SessionConfig) -> Result<Self> {
        let api = ApiUrl::new(&global.api_url).context("Invalid API URL")?;
        let client = HttpClient::new(api).context("Failed to create HTTP client")?;

        let store = match global.store_dir {
            Some(ref dir) => FileCredentialStore::new(dir),
            None => FileCredentialStore::default_location()
                .context("Could not determine credential directory")?,
        };
        debug!(store = %store.root().display(), api = %client.api(), "Opening session");

        let provider = Arc::new(HttpIdentityProvider::from_client(client.clone()));
        let session = Session::with_config(provider, Arc::new(store), config);
        session.initialize().await;

        Ok(Self { session, client })
    }

    /// The authenticated request pipeline.
    pub fn api(&self) -> AuthInterceptor<HttpExecutor> {
        AuthInterceptor::new(
            self.session.clone(),
            HttpExecutor::from_client(self.client.clone()),
        )
    }
}
