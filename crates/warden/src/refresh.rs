//! Single-flight token refresh.
//!
//! Any number of callers may ask for a refresh at the same time. The first
//! one starts it; everyone who arrives while it is in flight awaits the same
//! shared future and observes the same outcome. The slot is released once
//! the refresh resolves, so the next trigger starts a fresh one.

use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::Mutex;
use tracing::{debug, error};

use warden_core::AuthTokens;

/// Result of a refresh, shared by every caller that awaited it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New tokens were persisted and published.
    Refreshed(AuthTokens),
    /// The session could not be renewed and has been logged out locally.
    SessionExpired { reason: String },
    /// The session changed (logout or a new login) while the refresh was in
    /// flight; its result was discarded.
    Superseded,
}

impl RefreshOutcome {
    pub fn is_refreshed(&self) -> bool {
        matches!(self, RefreshOutcome::Refreshed(_))
    }

    /// Returns the new tokens on success.
    pub fn tokens(&self) -> Option<&AuthTokens> {
        match self {
            RefreshOutcome::Refreshed(tokens) => Some(tokens),
            _ => None,
        }
    }
}

type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

struct InFlight {
    id: u64,
    future: SharedRefresh,
}

/// Owner of the single in-flight refresh slot.
#[derive(Default)]
pub(crate) struct RefreshCoordinator {
    slot: Mutex<Option<InFlight>>,
    next_id: AtomicU64,
}

impl RefreshCoordinator {
    /// Join the in-flight refresh, or start one with `start`.
    ///
    /// The refresh body runs on its own task, so a caller that stops waiting
    /// never cancels a refresh halfway through persisting new tokens.
    pub(crate) async fn run<F>(&self, start: F) -> RefreshOutcome
    where
        F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
    {
        let (id, future) = {
            let mut slot = self.slot.lock().await;
            match slot.as_ref() {
                Some(in_flight) if in_flight.future.peek().is_none() => {
                    debug!(id = in_flight.id, "Joining in-flight refresh");
                    (in_flight.id, in_flight.future.clone())
                }
                _ => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    debug!(id, "Starting refresh");

                    let task = tokio::spawn(start());
                    let future = async move {
                        task.await.unwrap_or_else(|e| {
                            error!(error = %e, "Refresh task failed");
                            RefreshOutcome::SessionExpired {
                                reason: format!("refresh task failed: {}", e),
                            }
                        })
                    }
                    .boxed()
                    .shared();

                    *slot = Some(InFlight {
                        id,
                        future: future.clone(),
                    });
                    (id, future)
                }
            }
        };

        let outcome = future.await;
        self.release(id).await;
        outcome
    }

    /// Returns true while a refresh is running.
    pub(crate) async fn in_flight(&self) -> bool {
        self.slot
            .lock()
            .await
            .as_ref()
            .is_some_and(|in_flight| in_flight.future.peek().is_none())
    }

    async fn release(&self, id: u64) {
        let mut slot = self.slot.lock().await;
        if slot.as_ref().is_some_and(|in_flight| in_flight.id == id) {
            *slot = None;
        }
    }
}
