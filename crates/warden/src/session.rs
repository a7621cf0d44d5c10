//! The session state machine.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, Weak};

use futures_util::FutureExt;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use warden_core::clock;
use warden_core::error::{
    AuthError, LOGIN_FAILED_MESSAGE, RESTORE_FAILED_MESSAGE, SESSION_EXPIRED_MESSAGE,
};
use warden_core::{
    CredentialStore, IdentityProvider, LoginCredentials, Outcome, Result, SessionPhase,
    SessionState, UserProfile,
};

use crate::config::SessionConfig;
use crate::refresh::{RefreshCoordinator, RefreshOutcome};

/// An authenticated session with an identity provider.
///
/// `Session` owns the token lifecycle: it restores persisted credentials,
/// logs in and out, refreshes tokens on demand or proactively, and publishes
/// every change as a [`SessionState`] snapshot.
///
/// # Thread Safety
///
/// Sessions are cheap to clone (they share an internal `Arc`). All clones
/// drive the same state and share the same single-flight refresh slot.
///
/// # Stale results
///
/// Logout, a successful login and session expiry each start a new session
/// generation. A login, refresh or profile fetch that completes after the
/// generation it started in has ended is discarded instead of applied.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn CredentialStore>,
    config: SessionConfig,
    state: watch::Sender<SessionState>,
    generation: AtomicU64,
    // Held across generation check, store write and state publish.
    transition: Mutex<()>,
    refresh: RefreshCoordinator,
    poller: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Create a session with the default configuration.
    ///
    /// The session starts `Uninitialized`; call [`Session::initialize`] to
    /// restore persisted credentials.
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn CredentialStore>) -> Self {
        Self::with_config(provider, store, SessionConfig::default())
    }

    pub fn with_config(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn CredentialStore>,
        config: SessionConfig,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::initial());
        Self {
            inner: Arc::new(SessionInner {
                provider,
                store,
                config,
                state,
                generation: AtomicU64::new(0),
                transition: Mutex::new(()),
                refresh: RefreshCoordinator::default(),
                poller: std::sync::Mutex::new(None),
            }),
        }
    }

    /// Restore the session from the credential store.
    ///
    /// Always leaves the session `Authenticated` or `Unauthenticated`, never
    /// `Restoring`.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        let inner = &self.inner;
        inner.state.send_modify(|s| {
            s.phase = SessionPhase::Restoring;
            s.is_loading = true;
        });

        let (tokens, user) =
            tokio::join!(inner.store.try_get_tokens(), inner.store.try_get_user());

        let _guard = inner.transition.lock().await;
        match (tokens, user) {
            (Ok(Some(tokens)), Ok(Some(user))) => {
                info!(user_id = user.id, "Restored session");
                inner
                    .state
                    .send_replace(SessionState::authenticated(Some(user), tokens));
                self.on_authenticated();
            }
            (Ok(_), Ok(_)) => {
                debug!("No stored session");
                inner.state.send_replace(SessionState::unauthenticated(None));
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Failed to restore session");
                inner.state.send_replace(SessionState::unauthenticated(Some(
                    RESTORE_FAILED_MESSAGE.to_string(),
                )));
            }
        }
    }

    /// Log in with the given credentials.
    ///
    /// On failure the error message published in the state is the provider's
    /// own message when it sent one, or "Login failed".
    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    pub async fn login(&self, credentials: LoginCredentials) -> Result<UserProfile> {
        let inner = &self.inner;
        let generation = inner.generation();
        inner.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });

        info!("Logging in");
        let output = match inner.provider.login(&credentials).await {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "Login failed");
                let message = e.user_message(LOGIN_FAILED_MESSAGE);
                let _guard = inner.transition.lock().await;
                if inner.generation() == generation {
                    inner.state.send_modify(|s| {
                        s.is_loading = false;
                        s.error = Some(message);
                    });
                }
                return Err(e);
            }
        };

        {
            let _guard = inner.transition.lock().await;
            if inner.generation() != generation {
                debug!("Discarding login that resolved after the session changed");
                inner.state.send_modify(|s| s.is_loading = false);
                return Err(AuthError::Superseded.into());
            }

            if let Err(e) = inner.store.save_tokens(&output.tokens).await {
                let message = e.user_message(LOGIN_FAILED_MESSAGE);
                inner.state.send_modify(|s| {
                    s.is_loading = false;
                    s.error = Some(message);
                });
                return Err(e);
            }
            if let Some(e) = inner.store.save_user(&output.user).await.warning() {
                debug!(error = %e, "Profile cache not written");
            }

            inner.bump_generation();
            inner.state.send_replace(SessionState::authenticated(
                Some(output.user.clone()),
                output.tokens,
            ));
            self.on_authenticated();
        }

        info!(user_id = output.user.id, "Logged in");
        Ok(output.user)
    }

    /// Log out.
    ///
    /// The provider is told about the logout on a best-effort basis. Local
    /// storage and state are cleared regardless; a failure in either step is
    /// reported as an advisory.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Outcome<()> {
        let inner = &self.inner;
        let _guard = inner.transition.lock().await;
        inner.bump_generation();
        inner.stop_poller();
        inner.state.send_modify(|s| s.is_loading = true);

        let remote = match inner.store.get_tokens().await {
            Some(tokens) => {
                let result = inner.provider.logout(&tokens.access_token).await;
                if let Err(ref e) = result {
                    warn!(error = %e, "Provider logout failed, clearing local session anyway");
                }
                Outcome::absorb(result, ())
            }
            None => Outcome::Ok(()),
        };

        let cleared = inner.store.clear_auth_storage().await;
        inner.state.send_replace(SessionState::unauthenticated(None));

        info!("Logged out");
        remote.and(cleared)
    }

    /// Refresh the token pair.
    ///
    /// Single-flight: concurrent callers share one provider call and all
    /// observe the same outcome. Failure is terminal for the session.
    pub async fn refresh(&self) -> RefreshOutcome {
        let inner = self.inner.clone();
        self.inner
            .refresh
            .run(move || inner.perform_refresh().boxed())
            .await
    }

    /// Refresh if the stored access token expires within the configured
    /// threshold.
    ///
    /// Returns `None` when no refresh was needed (or the session isn't
    /// authenticated).
    pub async fn check_token_expiry(&self) -> Option<RefreshOutcome> {
        let inner = &self.inner;
        if !inner.state.borrow().is_authenticated {
            return None;
        }

        let tokens = inner.store.get_tokens().await?;
        let threshold = inner.config.refresh_threshold_mins;
        if !clock::will_expire_within(tokens.access_token.as_str(), threshold) {
            debug!(
                remaining_secs = clock::remaining_seconds(tokens.access_token.as_str()),
                "Access token still fresh"
            );
            return None;
        }

        info!(threshold_mins = threshold, "Access token expiring soon, refreshing");
        Some(self.refresh().await)
    }

    /// Fetch the profile from the provider and update the cache.
    ///
    /// A failure leaves the cached profile untouched and never ends the
    /// session.
    #[instrument(skip(self))]
    pub async fn fetch_profile(&self) -> Result<UserProfile> {
        let inner = &self.inner;
        let generation = inner.generation();
        let tokens = inner
            .store
            .get_tokens()
            .await
            .ok_or(AuthError::NotAuthenticated)?;

        let user = match inner.provider.fetch_profile(&tokens.access_token).await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Profile fetch failed, keeping cached profile");
                return Err(e);
            }
        };

        let _guard = inner.transition.lock().await;
        if inner.generation() != generation {
            debug!("Discarding profile that resolved after the session changed");
            return Err(AuthError::Superseded.into());
        }

        if let Some(e) = inner.store.save_user(&user).await.warning() {
            debug!(error = %e, "Profile cache not updated");
        }
        inner.state.send_modify(|s| {
            if s.is_authenticated {
                s.user = Some(user.clone());
            }
        });

        debug!(user_id = user.id, "Profile updated");
        Ok(user)
    }

    /// Clear the published error message.
    pub fn clear_error(&self) {
        self.inner.state.send_if_modified(|s| s.error.take().is_some());
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Returns true while a token refresh is in flight.
    pub async fn is_refreshing(&self) -> bool {
        self.inner.refresh.in_flight().await
    }

    /// Returns true while the proactive refresh poller is running.
    pub fn is_polling(&self) -> bool {
        self.inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop background work. The session remains usable.
    pub fn shutdown(&self) {
        self.inner.stop_poller();
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// The credential store backing this session.
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    /// Start the work that follows entering `Authenticated`. Callers hold
    /// `transition`, so a logout cannot slip in before the poller exists.
    fn on_authenticated(&self) {
        if self.inner.config.auto_refresh {
            self.start_poller();
        }
        if self.inner.config.sync_profile {
            let session = self.clone();
            tokio::spawn(async move {
                // Failures are logged inside fetch_profile.
                let _ = session.fetch_profile().await;
            });
        }
    }

    fn start_poller(&self) {
        let weak: Weak<SessionInner> = Arc::downgrade(&self.inner);
        let period = self.inner.config.poll_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if !inner.state.borrow().is_authenticated {
                    break;
                }
                let session = Session { inner };
                if let Some(RefreshOutcome::SessionExpired { .. } | RefreshOutcome::Superseded) =
                    session.check_token_expiry().await
                {
                    break;
                }
            }
            debug!("Refresh poller stopped");
        });

        let previous = self
            .inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
        debug!(period_secs = period.as_secs(), "Refresh poller started");
    }
}

impl SessionInner {
    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn stop_poller(&self) {
        let handle = self
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    /// The body of a refresh. Runs on its own task via the coordinator.
    async fn perform_refresh(self: Arc<Self>) -> RefreshOutcome {
        let generation = self.generation();
        self.state.send_if_modified(|s| {
            if !s.is_authenticated {
                return false;
            }
            s.phase = SessionPhase::Refreshing;
            s.is_refreshing = true;
            true
        });

        let Some(tokens) = self.store.get_tokens().await else {
            return self.expire(generation, "no refresh token stored").await;
        };

        if clock::is_expired(tokens.refresh_token.as_str()) {
            return self.expire(generation, "refresh token expired").await;
        }

        let refreshed = self
            .provider
            .refresh(&tokens.refresh_token, self.config.refresh_expires_in_mins)
            .await;
        let new_tokens = match refreshed {
            Ok(new_tokens) => new_tokens,
            Err(e) => {
                warn!(error = %e, "Provider rejected refresh");
                return self.expire(generation, &e.to_string()).await;
            }
        };

        let _guard = self.transition.lock().await;
        if self.generation() != generation {
            debug!("Discarding refresh that resolved after the session changed");
            return RefreshOutcome::Superseded;
        }

        // Persist before publishing, so the store never lags the state.
        if let Err(e) = self.store.save_tokens(&new_tokens).await {
            return self
                .expire_locked(generation, &format!("failed to persist tokens: {}", e))
                .await;
        }

        let was_authenticated = self.state.borrow().is_authenticated;
        self.state.send_modify(|s| {
            let user = s.user.take();
            *s = SessionState::authenticated(user, new_tokens.clone());
        });

        if !was_authenticated {
            info!("Stored tokens refreshed, session authenticated");
            Session {
                inner: self.clone(),
            }
            .on_authenticated();
        }

        info!("Tokens refreshed");
        RefreshOutcome::Refreshed(new_tokens)
    }

    async fn expire(&self, generation: u64, reason: &str) -> RefreshOutcome {
        let _guard = self.transition.lock().await;
        self.expire_locked(generation, reason).await
    }

    /// End the session after a failed refresh. Caller holds `transition`.
    async fn expire_locked(&self, generation: u64, reason: &str) -> RefreshOutcome {
        if self.generation() != generation {
            debug!(reason, "Refresh failed after the session changed, ignoring");
            return RefreshOutcome::Superseded;
        }

        self.bump_generation();
        self.stop_poller();
        if let Some(e) = self.store.clear_auth_storage().await.warning() {
            debug!(error = %e, "Stored credentials not fully cleared");
        }
        self.state.send_replace(SessionState::unauthenticated(Some(
            SESSION_EXPIRED_MESSAGE.to_string(),
        )));

        info!(reason, "Session expired");
        RefreshOutcome::SessionExpired {
            reason: reason.to_string(),
        }
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.stop_poller();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Session")
            .field("phase", &state.phase)
            .field("user_id", &state.user.as_ref().map(|u| u.id))
            .field("config", &self.inner.config)
            .finish()
    }
}
