//! # Credential Manager
//!
//! Owns the single bearer credential of a session and its lifecycle.
//!
//! ## Overview
//!
//! ```text
//!                 ensure_authorized()
//!  Unauthorized ───────────────────────> Authorizing
//!       ^   ^                               │    │
//!       │   │ Denied (message recorded)     │    │ Granted
//!       │   └───────────────────────────────┘    v
//!       │        revoke() / found expired     Authorized
//!       └─────────────────────────────────────────┘
//! ```
//!
//! - A valid credential (`now < expires_at_ms`) is handed out without any
//!   provider interaction.
//! - At most one authorization round-trip runs at a time. Callers arriving
//!   while one is in flight await the same shared future and get its outcome.
//! - The shared future applies its own outcome to the manager state, so a
//!   caller that stops waiting leaves it for the next caller to drive.
//! - Revocation clears the credential only after the provider confirms.
//!
//! ## Usage
//!
//! ```ignore
//! use core_auth::CredentialManager;
//! use core_runtime::events::EventBus;
//!
//! let manager = CredentialManager::from_config(&config, EventBus::default());
//! let credential = manager.ensure_authorized().await?;
//! ```

use crate::error::{AuthError, Result};
use crate::types::{
    AuthState, AuthorizationOutcome, BearerToken, Credential, DenialReason, Revocation,
};
use bridge_traits::platform::{boxed, PlatformBoxFuture};
use bridge_traits::{Clock, IdentityProvider};
use core_runtime::config::DemoConfig;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use futures::future::{FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, info, instrument, warn};

type InFlight = Shared<PlatformBoxFuture<'static, Result<Credential>>>;

struct ManagerState {
    credential: Option<Credential>,
    state: AuthState,
    last_error: Option<String>,
    in_flight: Option<InFlight>,
}

impl ManagerState {
    fn new() -> Self {
        Self {
            credential: None,
            state: AuthState::Unauthorized,
            last_error: None,
            in_flight: None,
        }
    }
}

struct ManagerCore {
    client_id: Arc<str>,
    scope: Arc<str>,
    identity: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
    state: Arc<Mutex<ManagerState>>,
}

impl ManagerCore {
    fn lock(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: AuthEvent) {
        let _ = self.event_bus.emit(CoreEvent::Auth(event));
    }

    fn attempt(&self) -> Attempt {
        Attempt {
            client_id: Arc::clone(&self.client_id),
            scope: Arc::clone(&self.scope),
            identity: Arc::clone(&self.identity),
            clock: Arc::clone(&self.clock),
            event_bus: self.event_bus.clone(),
            state: Arc::downgrade(&self.state),
        }
    }
}

/// One authorization round-trip, stored in the state it reports to.
///
/// The state is held weakly, so a manager dropped mid-round-trip frees its
/// state together with the pending attempt.
struct Attempt {
    client_id: Arc<str>,
    scope: Arc<str>,
    identity: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
    state: Weak<Mutex<ManagerState>>,
}

impl Attempt {
    async fn run(self) -> Result<Credential> {
        debug!(scope = %self.scope, "Requesting token from identity provider");
        let response = self.identity.request_token(&self.client_id, &self.scope).await;
        let now = self.clock.now_millis();

        let result: std::result::Result<Credential, DenialReason> =
            match AuthorizationOutcome::classify(response, &self.scope) {
                AuthorizationOutcome::Granted {
                    token,
                    expires_in_seconds,
                    granted_scopes,
                } => {
                    let lifetime_ms = i64::try_from(expires_in_seconds)
                        .unwrap_or(i64::MAX)
                        .saturating_mul(1000);
                    Ok(Credential::new(
                        token,
                        now.saturating_add(lifetime_ms),
                        granted_scopes,
                    ))
                }
                AuthorizationOutcome::Denied { reason } => Err(reason),
            };

        let Some(state) = self.state.upgrade() else {
            debug!("Credential manager dropped before authorization finished");
            return result.map_err(AuthError::AuthorizationDenied);
        };

        {
            let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
            guard.in_flight = None;
            match &result {
                Ok(credential) => {
                    guard.credential = Some(credential.clone());
                    guard.last_error = None;
                    guard.state = AuthState::Authorized;
                }
                Err(reason) => {
                    guard.credential = None;
                    guard.last_error = Some(reason.to_string());
                    guard.state = AuthState::Unauthorized;
                }
            }
        }

        match result {
            Ok(credential) => {
                info!(expires_at_ms = credential.expires_at_ms, "Authorization granted");
                self.emit(AuthEvent::Authorized {
                    expires_at_ms: credential.expires_at_ms,
                });
                Ok(credential)
            }
            Err(reason) => {
                warn!(reason = ?reason, "Authorization denied");
                self.emit(AuthEvent::AuthorizationDenied {
                    message: reason.to_string(),
                });
                Err(AuthError::AuthorizationDenied(reason))
            }
        }
    }

    fn emit(&self, event: AuthEvent) {
        let _ = self.event_bus.emit(CoreEvent::Auth(event));
    }
}

/// Single owner of the session credential.
pub struct CredentialManager {
    inner: ManagerCore,
}

impl CredentialManager {
    /// Creates a manager for `scope` on behalf of `client_id`.
    pub fn new(
        client_id: impl Into<String>,
        scope: impl Into<String>,
        identity: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            inner: ManagerCore {
                client_id: Arc::from(client_id.into()),
                scope: Arc::from(scope.into()),
                identity,
                clock,
                event_bus,
                state: Arc::new(Mutex::new(ManagerState::new())),
            },
        }
    }

    /// Creates a manager from validated configuration.
    pub fn from_config(config: &DemoConfig, event_bus: EventBus) -> Self {
        Self::new(
            config.client_id.clone(),
            config.scope.clone(),
            Arc::clone(&config.identity_provider),
            Arc::clone(&config.clock),
            event_bus,
        )
    }

    /// Returns a valid credential, authorizing first when none is held.
    ///
    /// Exactly one provider round-trip runs for any number of concurrent
    /// callers. An expired credential is discarded before authorizing again.
    ///
    /// # Errors
    ///
    /// `AuthError::AuthorizationDenied` when the round-trip produced no
    /// credential; [`last_error`](Self::last_error) then holds the message.
    #[instrument(skip(self), fields(scope = %self.inner.scope))]
    pub async fn ensure_authorized(&self) -> Result<Credential> {
        let (pending, expired, started) = {
            let mut guard = self.inner.lock();
            let now = self.inner.clock.now_millis();

            let mut expired = false;
            if let Some(credential) = &guard.credential {
                if credential.is_valid_at(now) {
                    debug!("Reusing cached credential");
                    return Ok(credential.clone());
                }
                guard.credential = None;
                guard.state = AuthState::Unauthorized;
                expired = true;
            }

            match &guard.in_flight {
                Some(pending) => (pending.clone(), expired, false),
                None => {
                    let pending = boxed(self.inner.attempt().run()).shared();
                    guard.in_flight = Some(pending.clone());
                    guard.state = AuthState::Authorizing;
                    (pending, expired, true)
                }
            }
        };

        if expired {
            info!("Credential expired, authorizing again");
            self.inner.emit(AuthEvent::CredentialExpired);
        }
        if started {
            self.inner.emit(AuthEvent::Authorizing);
        } else {
            debug!("Joining in-flight authorization");
        }

        pending.await
    }

    /// Revokes the held token with the provider.
    ///
    /// The credential is cleared only after the provider confirms. A grant that
    /// replaced the token meanwhile is kept and reported as
    /// [`Revocation::Superseded`], without a `Revoked` event.
    ///
    /// # Errors
    ///
    /// `AuthError::RevocationFailed` when the provider did not confirm; the
    /// credential is left in place.
    #[instrument(skip(self))]
    pub async fn revoke(&self) -> Result<Revocation> {
        let token: Option<BearerToken> = self
            .inner
            .lock()
            .credential
            .as_ref()
            .map(|credential| credential.token.clone());

        let Some(token) = token else {
            debug!("No credential held, nothing to revoke");
            return Ok(Revocation::NothingToRevoke);
        };

        self.inner
            .identity
            .revoke_token(token.as_str())
            .await
            .map_err(|e| {
                warn!(error = %e, "Revocation failed");
                AuthError::RevocationFailed(e.detail().to_string())
            })?;

        let superseded = {
            let mut guard = self.inner.lock();
            match &guard.credential {
                Some(credential) if credential.token != token => true,
                _ => {
                    guard.credential = None;
                    if guard.in_flight.is_none() {
                        guard.state = AuthState::Unauthorized;
                    }
                    false
                }
            }
        };

        if superseded {
            info!("Revoked token was already replaced by a newer grant");
            return Ok(Revocation::Superseded);
        }

        info!("Credential revoked");
        self.inner.emit(AuthEvent::Revoked);
        Ok(Revocation::Revoked)
    }

    pub fn state(&self) -> AuthState {
        self.inner.lock().state
    }

    /// Message of the most recent authorization failure, cleared by the next grant.
    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error.clone()
    }

    /// The held credential if it is still valid. Never contacts the provider.
    pub fn current_credential(&self) -> Option<Credential> {
        let now = self.inner.clock.now_millis();
        self.inner
            .lock()
            .credential
            .as_ref()
            .filter(|credential| credential.is_valid_at(now))
            .cloned()
    }

    pub fn scope(&self) -> &str {
        &self.inner.scope
    }

    pub fn client_id(&self) -> &str {
        &self.inner.client_id
    }
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.inner.lock();
        f.debug_struct("CredentialManager")
            .field("scope", &self.inner.scope)
            .field("state", &guard.state)
            .field("has_credential", &guard.credential.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DenialReason;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::identity::{TokenGrant, TokenRequestError};
    use mockall::mock;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    const CLIENT_ID: &str = "1234.apps.googleusercontent.com";
    const SCOPE: &str = "https://www.googleapis.com/auth/drive.metadata.readonly";

    struct ManualClock(AtomicI64);

    impl ManualClock {
        fn at(ms: i64) -> Arc<Self> {
            Arc::new(Self(AtomicI64::new(ms)))
        }

        fn set(&self, ms: i64) {
            self.0.store(ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    /// Scripted identity provider. Each request pops the next response and
    /// yields a few times first so concurrent callers can pile up.
    #[derive(Default)]
    struct ScriptedIdentity {
        responses: Mutex<VecDeque<std::result::Result<TokenGrant, TokenRequestError>>>,
        requests: AtomicUsize,
        revocations: Mutex<Vec<String>>,
    }

    impl ScriptedIdentity {
        fn with(responses: Vec<std::result::Result<TokenGrant, TokenRequestError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            })
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IdentityProvider for ScriptedIdentity {
        async fn request_token(
            &self,
            client_id: &str,
            scope: &str,
        ) -> std::result::Result<TokenGrant, TokenRequestError> {
            assert_eq!(client_id, CLIENT_ID);
            assert_eq!(scope, SCOPE);
            self.requests.fetch_add(1, Ordering::SeqCst);
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected token request")
        }

        async fn revoke_token(&self, token: &str) -> BridgeResult<()> {
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            self.revocations.lock().unwrap().push(token.to_string());
            Ok(())
        }
    }

    mock! {
        Identity {}

        #[async_trait]
        impl IdentityProvider for Identity {
            async fn request_token(
                &self,
                client_id: &str,
                scope: &str,
            ) -> std::result::Result<TokenGrant, TokenRequestError>;
            async fn revoke_token(&self, token: &str) -> BridgeResult<()>;
        }
    }

    fn grant(token: &str, expires_in: u64) -> std::result::Result<TokenGrant, TokenRequestError> {
        Ok(TokenGrant {
            access_token: token.to_string(),
            expires_in,
            scope: SCOPE.to_string(),
        })
    }

    fn manager(
        identity: Arc<dyn IdentityProvider>,
        clock: Arc<ManualClock>,
    ) -> (CredentialManager, EventBus) {
        let bus = EventBus::new(32);
        let manager = CredentialManager::new(CLIENT_ID, SCOPE, identity, clock, bus.clone());
        (manager, bus)
    }

    fn drain(rx: &mut core_runtime::events::Receiver<CoreEvent>) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_first_call_authorizes_once() {
        let identity = ScriptedIdentity::with(vec![grant("T", 3600)]);
        let clock = ManualClock::at(1_000);
        let (manager, bus) = manager(identity.clone(), clock);
        let mut rx = bus.subscribe();

        assert_eq!(manager.state(), AuthState::Unauthorized);
        let credential = manager.ensure_authorized().await.unwrap();

        assert_eq!(credential.token, BearerToken::new("T"));
        assert_eq!(credential.expires_at_ms, 1_000 + 3_600_000);
        assert!(credential.has_scope(SCOPE));
        assert_eq!(identity.requests(), 1);
        assert_eq!(manager.state(), AuthState::Authorized);
        assert_eq!(manager.last_error(), None);

        assert_eq!(
            drain(&mut rx),
            vec![
                CoreEvent::Auth(AuthEvent::Authorizing),
                CoreEvent::Auth(AuthEvent::Authorized {
                    expires_at_ms: 3_601_000
                }),
            ]
        );
    }

    #[tokio::test]
    async fn test_valid_credential_reused_without_provider_call() {
        let identity = ScriptedIdentity::with(vec![grant("T", 3600)]);
        let clock = ManualClock::at(0);
        let (manager, _bus) = manager(identity.clone(), clock.clone());

        let first = manager.ensure_authorized().await.unwrap();
        clock.set(3_599_999);
        let second = manager.ensure_authorized().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(identity.requests(), 1);
    }

    #[tokio::test]
    async fn test_expired_credential_requests_again() {
        let identity = ScriptedIdentity::with(vec![grant("T1", 3600), grant("T2", 3600)]);
        let clock = ManualClock::at(0);
        let (manager, bus) = manager(identity.clone(), clock.clone());

        manager.ensure_authorized().await.unwrap();
        let mut rx = bus.subscribe();

        clock.set(3_600_000 + 1);
        let renewed = manager.ensure_authorized().await.unwrap();

        assert_eq!(renewed.token, BearerToken::new("T2"));
        assert_eq!(identity.requests(), 2);
        assert_eq!(
            drain(&mut rx).first(),
            Some(&CoreEvent::Auth(AuthEvent::CredentialExpired))
        );
    }

    #[tokio::test]
    async fn test_expiry_instant_counts_as_expired() {
        let identity = ScriptedIdentity::with(vec![grant("T1", 3600), grant("T2", 3600)]);
        let clock = ManualClock::at(0);
        let (manager, _bus) = manager(identity.clone(), clock.clone());

        manager.ensure_authorized().await.unwrap();
        clock.set(3_600_000);

        assert_eq!(manager.current_credential(), None);
        let renewed = manager.ensure_authorized().await.unwrap();
        assert_eq!(renewed.token, BearerToken::new("T2"));
        assert_eq!(identity.requests(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_round_trip() {
        let identity = ScriptedIdentity::with(vec![grant("T", 3600)]);
        let (manager, _bus) = manager(identity.clone(), ManualClock::at(0));

        let (a, b, c) = tokio::join!(
            manager.ensure_authorized(),
            manager.ensure_authorized(),
            manager.ensure_authorized()
        );

        assert_eq!(identity.requests(), 1);
        let a = a.unwrap();
        assert_eq!(a, b.unwrap());
        assert_eq!(a, c.unwrap());
        assert_eq!(manager.state(), AuthState::Authorized);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_denial() {
        let identity = ScriptedIdentity::with(vec![Err(TokenRequestError::UserCancelled)]);
        let (manager, _bus) = manager(identity.clone(), ManualClock::at(0));

        let (a, b) = tokio::join!(manager.ensure_authorized(), manager.ensure_authorized());

        assert_eq!(identity.requests(), 1);
        let denied = AuthError::AuthorizationDenied(DenialReason::UserCancelled);
        assert_eq!(a.unwrap_err(), denied);
        assert_eq!(b.unwrap_err(), denied);
    }

    #[tokio::test]
    async fn test_state_is_authorizing_while_in_flight() {
        let identity = ScriptedIdentity::with(vec![grant("T", 3600)]);
        let (manager, _bus) = manager(identity.clone(), ManualClock::at(0));

        let mut pending = Box::pin(manager.ensure_authorized());
        assert!(futures::poll!(pending.as_mut()).is_pending());
        assert_eq!(manager.state(), AuthState::Authorizing);

        pending.await.unwrap();
        assert_eq!(manager.state(), AuthState::Authorized);
    }

    #[tokio::test]
    async fn test_abandoned_attempt_is_resumed_by_next_caller() {
        let identity = ScriptedIdentity::with(vec![grant("T", 3600)]);
        let (manager, _bus) = manager(identity.clone(), ManualClock::at(0));

        {
            let mut pending = Box::pin(manager.ensure_authorized());
            assert!(futures::poll!(pending.as_mut()).is_pending());
        }
        assert_eq!(manager.state(), AuthState::Authorizing);

        let credential = manager.ensure_authorized().await.unwrap();
        assert_eq!(credential.token, BearerToken::new("T"));
        assert_eq!(identity.requests(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_clears_credential_and_records_message() {
        let identity = ScriptedIdentity::with(vec![
            grant("T1", 60),
            Err(TokenRequestError::UserCancelled),
        ]);
        let clock = ManualClock::at(0);
        let (manager, bus) = manager(identity.clone(), clock.clone());

        manager.ensure_authorized().await.unwrap();
        clock.set(60_000);
        let mut rx = bus.subscribe();

        let err = manager.ensure_authorized().await.unwrap_err();

        assert_eq!(err, AuthError::AuthorizationDenied(DenialReason::UserCancelled));
        assert_eq!(manager.state(), AuthState::Unauthorized);
        assert_eq!(manager.current_credential(), None);
        assert_eq!(
            manager.last_error().as_deref(),
            Some("Authorization was cancelled before access was granted.")
        );
        assert!(drain(&mut rx).contains(&CoreEvent::Auth(AuthEvent::AuthorizationDenied {
            message: "Authorization was cancelled before access was granted.".to_string()
        })));
    }

    #[tokio::test]
    async fn test_missing_scope_is_denied() {
        let identity = ScriptedIdentity::with(vec![Ok(TokenGrant {
            access_token: "T".to_string(),
            expires_in: 3600,
            scope: "openid".to_string(),
        })]);
        let (manager, _bus) = manager(identity, ManualClock::at(0));

        let err = manager.ensure_authorized().await.unwrap_err();

        assert_eq!(err, AuthError::AuthorizationDenied(DenialReason::ScopeNotGranted));
        assert_eq!(
            manager.last_error().as_deref(),
            Some("Read-only access to your Drive file list was not granted.")
        );
    }

    #[tokio::test]
    async fn test_grant_clears_previous_error() {
        let identity = ScriptedIdentity::with(vec![
            Err(TokenRequestError::from_oauth_error("invalid_client", None)),
            grant("T", 3600),
        ]);
        let (manager, _bus) = manager(identity, ManualClock::at(0));

        assert!(manager.ensure_authorized().await.is_err());
        assert_eq!(
            manager.last_error().as_deref(),
            Some("Authorization failed: provider returned invalid_client")
        );

        manager.ensure_authorized().await.unwrap();
        assert_eq!(manager.last_error(), None);
    }

    #[tokio::test]
    async fn test_revoke_without_token_is_noop() {
        let mut identity = MockIdentity::new();
        identity.expect_revoke_token().never();
        identity.expect_request_token().never();
        let (manager, _bus) = manager(Arc::new(identity), ManualClock::at(0));

        assert_eq!(manager.revoke().await.unwrap(), Revocation::NothingToRevoke);
    }

    #[tokio::test]
    async fn test_revoke_clears_after_confirmation() {
        let identity = ScriptedIdentity::with(vec![grant("T", 3600)]);
        let (manager, bus) = manager(identity.clone(), ManualClock::at(0));

        manager.ensure_authorized().await.unwrap();
        let mut rx = bus.subscribe();

        assert_eq!(manager.revoke().await.unwrap(), Revocation::Revoked);
        assert_eq!(identity.revocations.lock().unwrap().as_slice(), ["T"]);
        assert_eq!(manager.current_credential(), None);
        assert_eq!(manager.state(), AuthState::Unauthorized);
        assert_eq!(drain(&mut rx), vec![CoreEvent::Auth(AuthEvent::Revoked)]);
    }

    #[tokio::test]
    async fn test_revoke_failure_keeps_credential() {
        let mut identity = MockIdentity::new();
        identity
            .expect_request_token()
            .times(1)
            .returning(|_, _| grant("T", 3600));
        identity
            .expect_revoke_token()
            .times(1)
            .returning(|_| Err(BridgeError::OperationFailed("revoke endpoint unreachable".into())));
        let (manager, _bus) = manager(Arc::new(identity), ManualClock::at(0));

        let credential = manager.ensure_authorized().await.unwrap();
        let err = manager.revoke().await.unwrap_err();

        assert_eq!(
            err,
            AuthError::RevocationFailed("revoke endpoint unreachable".to_string())
        );
        assert_eq!(
            err.user_message(),
            "Revoking access failed: revoke endpoint unreachable"
        );
        assert_eq!(manager.current_credential(), Some(credential));
        assert_eq!(manager.state(), AuthState::Authorized);
    }

    #[tokio::test]
    async fn test_credential_kept_while_revoke_is_pending() {
        let identity = ScriptedIdentity::with(vec![grant("T", 3600)]);
        let (manager, bus) = manager(identity.clone(), ManualClock::at(0));

        let credential = manager.ensure_authorized().await.unwrap();
        let mut rx = bus.subscribe();

        let mut revoking = Box::pin(manager.revoke());
        assert!(futures::poll!(revoking.as_mut()).is_pending());

        assert_eq!(manager.current_credential(), Some(credential));
        assert_eq!(manager.state(), AuthState::Authorized);
        assert!(drain(&mut rx).is_empty());

        assert_eq!(revoking.await.unwrap(), Revocation::Revoked);
        assert_eq!(manager.current_credential(), None);
        assert_eq!(drain(&mut rx), vec![CoreEvent::Auth(AuthEvent::Revoked)]);
    }

    #[tokio::test]
    async fn test_revoke_confirmed_after_newer_grant_keeps_new_credential() {
        let identity = ScriptedIdentity::with(vec![grant("T1", 1), grant("T2", 3600)]);
        let clock = ManualClock::at(0);
        let (manager, bus) = manager(identity.clone(), clock.clone());

        manager.ensure_authorized().await.unwrap();
        let mut revoking = Box::pin(manager.revoke());
        assert!(futures::poll!(revoking.as_mut()).is_pending());

        clock.set(1_000);
        let renewed = manager.ensure_authorized().await.unwrap();
        assert_eq!(renewed.token, BearerToken::new("T2"));
        let mut rx = bus.subscribe();

        assert_eq!(revoking.await.unwrap(), Revocation::Superseded);
        assert_eq!(identity.revocations.lock().unwrap().as_slice(), ["T1"]);
        assert_eq!(manager.current_credential(), Some(renewed));
        assert_eq!(manager.state(), AuthState::Authorized);
        assert!(!drain(&mut rx).contains(&CoreEvent::Auth(AuthEvent::Revoked)));
    }

    #[tokio::test]
    async fn test_revoke_of_expired_token_still_clears() {
        let identity = ScriptedIdentity::with(vec![grant("T", 1)]);
        let clock = ManualClock::at(0);
        let (manager, _bus) = manager(identity.clone(), clock.clone());

        manager.ensure_authorized().await.unwrap();
        clock.set(5_000);

        assert_eq!(manager.revoke().await.unwrap(), Revocation::Revoked);
        assert_eq!(identity.revocations.lock().unwrap().as_slice(), ["T"]);
        assert_eq!(manager.state(), AuthState::Unauthorized);
    }

    #[tokio::test]
    async fn test_dropping_manager_releases_abandoned_attempt() {
        let identity = ScriptedIdentity::with(vec![grant("T", 3600)]);
        let (manager, _bus) = manager(identity.clone(), ManualClock::at(0));

        {
            let mut pending = Box::pin(manager.ensure_authorized());
            assert!(futures::poll!(pending.as_mut()).is_pending());
        }
        let state = Arc::downgrade(&manager.inner.state);
        drop(manager);

        assert!(state.upgrade().is_none());
        assert_eq!(Arc::strong_count(&identity), 1);
    }
}
