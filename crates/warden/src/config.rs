//! Session tuning knobs.

use std::time::Duration;

use warden_core::endpoints::NO_AUTH_PATHS;

/// How often the proactive refresh poller checks the access token.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Refresh when the access token has fewer than this many minutes left.
pub const DEFAULT_REFRESH_THRESHOLD_MINS: u32 = 2;

/// Access token lifetime requested from the refresh endpoint.
pub const DEFAULT_REFRESH_EXPIRES_IN_MINS: u32 = 5;

/// Configuration for a [`crate::Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub poll_interval: Duration,
    pub refresh_threshold_mins: u32,
    pub refresh_expires_in_mins: u32,
    /// Requests whose path contains any of these never carry a bearer token
    /// and never trigger a refresh on 401.
    pub no_auth_paths: Vec<String>,
    /// Run the proactive refresh poller while authenticated.
    pub auto_refresh: bool,
    /// Fetch the profile in the background whenever the session becomes
    /// authenticated.
    pub sync_profile: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            refresh_threshold_mins: DEFAULT_REFRESH_THRESHOLD_MINS,
            refresh_expires_in_mins: DEFAULT_REFRESH_EXPIRES_IN_MINS,
            no_auth_paths: NO_AUTH_PATHS.iter().map(|p| p.to_string()).collect(),
            auto_refresh: true,
            sync_profile: true,
        }
    }
}

impl SessionConfig {
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn refresh_threshold_mins(mut self, minutes: u32) -> Self {
        self.refresh_threshold_mins = minutes;
        self
    }

    pub fn refresh_expires_in_mins(mut self, minutes: u32) -> Self {
        self.refresh_expires_in_mins = minutes;
        self
    }

    pub fn auto_refresh(mut self, enabled: bool) -> Self {
        self.auto_refresh = enabled;
        self
    }

    pub fn sync_profile(mut self, enabled: bool) -> Self {
        self.sync_profile = enabled;
        self
    }

    /// Add a path fragment to the no-auth allowlist.
    pub fn allow_unauthenticated(mut self, path: impl Into<String>) -> Self {
        self.no_auth_paths.push(path.into());
        self
    }

    /// Returns true if requests to `path` should carry credentials.
    pub fn requires_auth(&self, path: &str) -> bool {
        !self
            .no_auth_paths
            .iter()
            .any(|fragment| path.contains(fragment.as_str()))
    }
}
