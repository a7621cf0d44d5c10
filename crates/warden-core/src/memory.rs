//! In-memory credential store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::Result;
use crate::tokens::AuthTokens;
use crate::traits::{ACCESS_TOKEN_KEY, CredentialStore, REFRESH_TOKEN_KEY};

/// A [`CredentialStore`] that lives only as long as the process.
///
/// Useful for tests and for embedding where persistence is handled elsewhere.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn read_key(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn write_key(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_key(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    // Both halves under one lock, so readers never see a mixed pair.
    async fn write_tokens(&self, tokens: &AuthTokens) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            ACCESS_TOKEN_KEY.to_string(),
            tokens.access_token.as_str().to_string(),
        );
        entries.insert(
            REFRESH_TOKEN_KEY.to_string(),
            tokens.refresh_token.as_str().to_string(),
        );
        Ok(())
    }
}
