//! Session state machine tests against an in-process provider and store.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{MockProvider, StickyStore, UnreadableStore, VALID_PASSWORD, VALID_USERNAME, jwt, profile};
use warden::error::{AuthError, RESTORE_FAILED_MESSAGE, SESSION_EXPIRED_MESSAGE};
use warden::{
    AuthTokens, CredentialStore, Error, LoginCredentials, MemoryCredentialStore, RefreshOutcome,
    Session, SessionConfig, SessionPhase,
};

fn quiet_config() -> SessionConfig {
    SessionConfig::default().auto_refresh(false).sync_profile(false)
}

fn session(provider: &Arc<MockProvider>, store: &Arc<MemoryCredentialStore>) -> Session {
    Session::with_config(provider.clone(), store.clone(), quiet_config())
}

async fn seed(store: &MemoryCredentialStore, tokens: &AuthTokens) {
    store.save_tokens(tokens).await.unwrap();
    assert!(!store.save_user(&profile()).await.is_advisory());
}

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let provider = Arc::new(MockProvider::default());
    let store = Arc::new(MemoryCredentialStore::new());
    let session = session(&provider, &store);

    session.initialize().await;
    assert_eq!(session.state().phase, SessionPhase::Unauthenticated);
    assert!(!session.state().is_loading);

    let user = session
        .login(LoginCredentials::new(VALID_USERNAME, VALID_PASSWORD))
        .await
        .unwrap();
    assert_eq!(user.username, VALID_USERNAME);

    let state = session.state();
    assert!(state.is_authenticated);
    assert!(!state.is_loading);
    assert_eq!(state.error, None);
    assert_eq!(state.user.as_ref().map(|u| u.id), Some(7));

    let stored = store.get_tokens().await.unwrap();
    assert_eq!(Some(&stored), state.tokens.as_ref());
    assert_eq!(store.get_user().await, Some(profile()));
}

#[tokio::test]
async fn test_login_failure_surfaces_provider_message() {
    let provider = Arc::new(MockProvider::default());
    let store = Arc::new(MemoryCredentialStore::new());
    let session = session(&provider, &store);
    session.initialize().await;

    let err = session
        .login(LoginCredentials::new(VALID_USERNAME, "wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Provider(_)));

    let state = session.state();
    assert!(!state.is_authenticated);
    assert!(!state.is_loading);
    assert_eq!(state.error.as_deref(), Some("Invalid credentials"));
    assert!(store.is_empty().await);

    session.clear_error();
    assert_eq!(session.state().error, None);
}

#[tokio::test]
async fn test_login_clears_previous_error() {
    let provider = Arc::new(MockProvider::default());
    let store = Arc::new(MemoryCredentialStore::new());
    let session = session(&provider, &store);
    session.initialize().await;

    let _ = session.login(LoginCredentials::new("nobody", "nothing")).await;
    assert!(session.state().error.is_some());

    session
        .login(LoginCredentials::new(VALID_USERNAME, VALID_PASSWORD))
        .await
        .unwrap();
    assert_eq!(session.state().error, None);
}

#[tokio::test]
async fn test_initialize_restores_stored_session() {
    let provider = Arc::new(MockProvider::default());
    let store = Arc::new(MemoryCredentialStore::new());
    let tokens = AuthTokens::new(jwt(1800, "access"), jwt(3600, "refresh"));
    seed(&store, &tokens).await;

    let session = session(&provider, &store);
    session.initialize().await;

    let state = session.state();
    assert_eq!(state.phase, SessionPhase::Authenticated);
    assert_eq!(state.tokens, Some(tokens));
    assert_eq!(state.user, Some(profile()));
    assert_eq!(provider.login_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_initialize_without_profile_is_unauthenticated() {
    let provider = Arc::new(MockProvider::default());
    let store = Arc::new(MemoryCredentialStore::new());
    store
        .save_tokens(&AuthTokens::new(jwt(1800, "access"), jwt(3600, "refresh")))
        .await
        .unwrap();

    let session = session(&provider, &store);
    session.initialize().await;

    let state = session.state();
    assert_eq!(state.phase, SessionPhase::Unauthenticated);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn test_initialize_storage_failure() {
    let provider = Arc::new(MockProvider::default());
    let session = Session::with_config(provider, Arc::new(UnreadableStore), quiet_config());

    session.initialize().await;

    let state = session.state();
    assert_eq!(state.phase, SessionPhase::Unauthenticated);
    assert!(!state.is_loading);
    assert_eq!(state.error.as_deref(), Some(RESTORE_FAILED_MESSAGE));
}

#[tokio::test]
async fn test_logout_with_provider_down_still_clears() {
    let provider = Arc::new(MockProvider {
        logout_down: true,
        ..Default::default()
    });
    let store = Arc::new(MemoryCredentialStore::new());
    let session = session(&provider, &store);
    session.initialize().await;
    session
        .login(LoginCredentials::new(VALID_USERNAME, VALID_PASSWORD))
        .await
        .unwrap();

    let outcome = session.logout().await;

    assert!(outcome.is_advisory());
    assert_eq!(provider.logout_calls.load(Ordering::SeqCst), 1);
    let state = session.state();
    assert_eq!(state.phase, SessionPhase::Unauthenticated);
    assert_eq!(state.error, None);
    assert_eq!(state.tokens, None);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_logout_without_tokens_skips_provider() {
    let provider = Arc::new(MockProvider::default());
    let store = Arc::new(MemoryCredentialStore::new());
    let session = session(&provider, &store);
    session.initialize().await;

    assert!(!session.logout().await.is_advisory());
    assert_eq!(provider.logout_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_expired_refresh_token_ends_session_without_provider_call() {
    let provider = Arc::new(MockProvider::default());
    let store = Arc::new(MemoryCredentialStore::new());
    seed(&store, &AuthTokens::new(jwt(-10, "access"), jwt(-5, "refresh"))).await;

    let session = session(&provider, &store);
    session.initialize().await;
    assert!(session.state().is_authenticated);

    let outcome = session.refresh().await;

    assert!(matches!(outcome, RefreshOutcome::SessionExpired { .. }));
    assert_eq!(provider.refreshes(), 0);
    assert_eq!(store.get_tokens().await, None);
    assert_eq!(store.get_user().await, None);
    let state = session.state();
    assert!(!state.is_authenticated);
    assert_eq!(state.error.as_deref(), Some(SESSION_EXPIRED_MESSAGE));
}

#[tokio::test]
async fn test_rejected_refresh_ends_session() {
    let provider = Arc::new(MockProvider {
        reject_refresh: true,
        ..Default::default()
    });
    let store = Arc::new(MemoryCredentialStore::new());
    seed(&store, &AuthTokens::new(jwt(30, "access"), jwt(3600, "refresh"))).await;

    let session = session(&provider, &store);
    session.initialize().await;
    let outcome = session.refresh().await;

    assert!(matches!(outcome, RefreshOutcome::SessionExpired { .. }));
    assert_eq!(provider.refreshes(), 1);
    assert!(store.is_empty().await);
    assert_eq!(
        session.state().error.as_deref(),
        Some(SESSION_EXPIRED_MESSAGE)
    );
}

#[tokio::test]
async fn test_refresh_persists_before_publishing() {
    let provider = Arc::new(MockProvider::default());
    let store = Arc::new(MemoryCredentialStore::new());
    seed(&store, &AuthTokens::new(jwt(30, "access"), jwt(3600, "refresh"))).await;

    let session = session(&provider, &store);
    session.initialize().await;
    let mut updates = session.subscribe();

    let outcome = session.refresh().await;
    let tokens = outcome.tokens().cloned().unwrap();

    assert_eq!(store.get_tokens().await, Some(tokens.clone()));
    updates.changed().await.unwrap();
    let state = updates.borrow_and_update().clone();
    assert_eq!(state.tokens, Some(tokens));
    assert_eq!(state.phase, SessionPhase::Authenticated);
    assert!(!state.is_refreshing);
    assert_eq!(state.user, Some(profile()));
}

#[tokio::test]
async fn test_refresh_publishes_refreshing_phase_while_in_flight() {
    let provider = Arc::new(MockProvider {
        refresh_delay: Duration::from_millis(250),
        ..Default::default()
    });
    let store = Arc::new(MemoryCredentialStore::new());
    seed(&store, &AuthTokens::new(jwt(30, "access"), jwt(3600, "refresh"))).await;

    let session = session(&provider, &store);
    session.initialize().await;
    let mut updates = session.subscribe();

    let pending = {
        let session = session.clone();
        tokio::spawn(async move { session.refresh().await })
    };

    let refreshing = tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|s| s.phase == SessionPhase::Refreshing),
    )
    .await
    .map(|state| state.map(|s| (s.is_refreshing, s.is_authenticated)));
    assert_eq!(refreshing.ok().and_then(|r| r.ok()), Some((true, true)));
    assert_eq!(session.state().phase, SessionPhase::Refreshing);

    assert!(pending.await.unwrap().is_refreshed());
    let state = session.state();
    assert_eq!(state.phase, SessionPhase::Authenticated);
    assert!(!state.is_refreshing);
    assert_eq!(state.user, Some(profile()));
}

#[tokio::test]
async fn test_refresh_of_stored_tokens_without_profile_starts_session_work() {
    let provider = Arc::new(MockProvider::default());
    let store = Arc::new(MemoryCredentialStore::new());
    store
        .save_tokens(&AuthTokens::new(jwt(30, "access"), jwt(3600, "refresh")))
        .await
        .unwrap();

    let session = Session::new(provider.clone(), store.clone());
    session.initialize().await;
    assert!(!session.state().is_authenticated);
    assert!(!session.is_polling());
    let mut updates = session.subscribe();

    assert!(session.refresh().await.is_refreshed());
    assert!(session.state().is_authenticated);
    assert!(session.is_polling());

    let synced = tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|s| s.user.is_some()),
    )
    .await
    .is_ok();
    assert!(synced);
    assert_eq!(provider.profile_calls.load(Ordering::SeqCst), 1);
    assert!(store.get_user().await.is_some());
    session.shutdown();
}

#[tokio::test]
async fn test_refresh_resolving_after_logout_is_discarded() {
    let provider = Arc::new(MockProvider {
        refresh_delay: Duration::from_millis(100),
        ..Default::default()
    });
    let store = Arc::new(MemoryCredentialStore::new());
    seed(&store, &AuthTokens::new(jwt(30, "access"), jwt(3600, "refresh"))).await;

    let session = session(&provider, &store);
    session.initialize().await;

    let pending = {
        let session = session.clone();
        tokio::spawn(async move { session.refresh().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(session.is_refreshing().await);
    let _ = session.logout().await;

    assert_eq!(pending.await.unwrap(), RefreshOutcome::Superseded);
    assert!(store.is_empty().await);
    let state = session.state();
    assert!(!state.is_authenticated);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn test_check_token_expiry_refreshes_only_near_expiry() {
    let provider = Arc::new(MockProvider::default());
    let store = Arc::new(MemoryCredentialStore::new());
    let session = session(&provider, &store);
    session.initialize().await;

    assert_eq!(session.check_token_expiry().await, None);

    session
        .login(LoginCredentials::new(VALID_USERNAME, VALID_PASSWORD))
        .await
        .unwrap();
    assert_eq!(session.check_token_expiry().await, None);
    assert_eq!(provider.refreshes(), 0);

    store
        .save_tokens(&AuthTokens::new(jwt(90, "access"), jwt(3600, "refresh")))
        .await
        .unwrap();
    let outcome = session.check_token_expiry().await.unwrap();
    assert!(outcome.is_refreshed());
    assert_eq!(provider.refreshes(), 1);
}

#[tokio::test]
async fn test_profile_fetch_failure_keeps_cache() {
    let provider = Arc::new(MockProvider {
        profile_down: true,
        ..Default::default()
    });
    let store = Arc::new(MemoryCredentialStore::new());
    seed(&store, &AuthTokens::new(jwt(1800, "access"), jwt(3600, "refresh"))).await;
    let session = session(&provider, &store);
    session.initialize().await;

    assert!(session.fetch_profile().await.is_err());

    let state = session.state();
    assert!(state.is_authenticated);
    assert_eq!(state.user, Some(profile()));
    assert_eq!(store.get_user().await, Some(profile()));
}

#[tokio::test]
async fn test_profile_fetch_updates_cache() {
    let provider = Arc::new(MockProvider::default());
    let store = Arc::new(MemoryCredentialStore::new());
    seed(&store, &AuthTokens::new(jwt(1800, "access"), jwt(3600, "refresh"))).await;
    let session = session(&provider, &store);
    session.initialize().await;

    let user = session.fetch_profile().await.unwrap();

    assert!(user.image.is_some());
    assert_eq!(session.state().user, Some(user.clone()));
    assert_eq!(store.get_user().await, Some(user));
}

#[tokio::test]
async fn test_profile_fetch_requires_tokens() {
    let provider = Arc::new(MockProvider::default());
    let store = Arc::new(MemoryCredentialStore::new());
    let session = session(&provider, &store);

    let err = session.fetch_profile().await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::NotAuthenticated)));
    assert_eq!(provider.profile_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_authenticating_syncs_profile_in_background() {
    let provider = Arc::new(MockProvider::default());
    let store = Arc::new(MemoryCredentialStore::new());
    let session = Session::with_config(
        provider.clone(),
        store.clone(),
        SessionConfig::default().auto_refresh(false),
    );
    session.initialize().await;
    let mut updates = session.subscribe();

    session
        .login(LoginCredentials::new(VALID_USERNAME, VALID_PASSWORD))
        .await
        .unwrap();

    let synced = tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|s| s.user.as_ref().is_some_and(|u| u.image.is_some())),
    )
    .await
    .is_ok();
    assert!(synced);
    assert_eq!(provider.profile_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_profile_cache_write_failure_is_advisory() {
    let provider = Arc::new(MockProvider::default());
    let store = Arc::new(StickyStore::default());
    let session = Session::with_config(provider.clone(), store.clone(), quiet_config());
    session.initialize().await;

    session
        .login(LoginCredentials::new(VALID_USERNAME, VALID_PASSWORD))
        .await
        .unwrap();
    let user = session.fetch_profile().await.unwrap();

    assert!(session.state().is_authenticated);
    assert_eq!(session.state().user, Some(user));
    assert_eq!(store.get_user().await, None);
}

#[tokio::test]
async fn test_expiry_with_uncleared_storage_still_ends_session() {
    let provider = Arc::new(MockProvider {
        reject_refresh: true,
        ..Default::default()
    });
    let store = Arc::new(StickyStore::default());
    let session = Session::with_config(provider.clone(), store.clone(), quiet_config());
    session.initialize().await;
    session
        .login(LoginCredentials::new(VALID_USERNAME, VALID_PASSWORD))
        .await
        .unwrap();

    let outcome = session.refresh().await;
    assert!(matches!(outcome, RefreshOutcome::SessionExpired { .. }));

    let state = session.state();
    assert!(!state.is_authenticated);
    assert_eq!(state.error.as_deref(), Some(SESSION_EXPIRED_MESSAGE));
}
