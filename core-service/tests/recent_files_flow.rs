//! End-to-end tests for the fetch and revoke triggers
//!
//! These run the real credential manager and Drive client against scripted
//! identity and HTTP fakes, stepping a manual clock:
//! - first fetch authorizes once and shows the listed files
//! - later fetches within the token lifetime reuse the credential
//! - an expired credential triggers exactly one new round-trip
//! - revoke clears the list only after the provider confirmed
//! - a revoke overtaken by a newer grant keeps that grant and the view

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::identity::{IdentityProvider, TokenGrant, TokenRequestError};
use bridge_traits::time::Clock;
use bytes::Bytes;
use core_runtime::config::{DemoConfig, DEFAULT_SCOPE};
use core_runtime::events::{AuthEvent, CoreEvent, FilesEvent};
use core_service::{AuthState, RecentFilesService, ViewState};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const START_MS: i64 = 1_700_000_000_000;

#[derive(Default)]
struct ManualClock(AtomicI64);

impl ManualClock {
    fn at(ms: i64) -> Self {
        Self(AtomicI64::new(ms))
    }

    fn advance(&self, ms: i64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Identity provider answering from a script, one entry per popup.
#[derive(Default)]
struct ScriptedIdentity {
    grants: Mutex<VecDeque<Result<TokenGrant, TokenRequestError>>>,
    popups: AtomicUsize,
    revoked: Mutex<Vec<String>>,
    fail_revoke: bool,
}

impl ScriptedIdentity {
    fn granting(tokens: &[&str]) -> Self {
        let grants = tokens
            .iter()
            .map(|token| {
                Ok(TokenGrant {
                    access_token: token.to_string(),
                    expires_in: 3600,
                    scope: DEFAULT_SCOPE.to_string(),
                })
            })
            .collect();
        Self {
            grants: Mutex::new(grants),
            ..Self::default()
        }
    }

    fn popups(&self) -> usize {
        self.popups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for ScriptedIdentity {
    async fn request_token(
        &self,
        _client_id: &str,
        _scope: &str,
    ) -> Result<TokenGrant, TokenRequestError> {
        self.popups.fetch_add(1, Ordering::SeqCst);
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        self.grants
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(TokenRequestError::UserCancelled))
    }

    async fn revoke_token(&self, token: &str) -> BridgeResult<()> {
        tokio::task::yield_now().await;
        if self.fail_revoke {
            return Err(BridgeError::OperationFailed("revoke not confirmed".into()));
        }
        self.revoked.lock().unwrap().push(token.to_string());
        Ok(())
    }
}

/// Drive stand-in that serves a fixed listing and records bearer tokens.
struct FakeDrive {
    status: u16,
    body: String,
    tokens: Mutex<Vec<String>>,
}

impl FakeDrive {
    fn listing(names: &[&str]) -> Self {
        let files: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                serde_json::json!({
                    "id": format!("id-{i}"),
                    "name": name,
                    "mimeType": "application/pdf",
                    "modifiedTime": "2024-05-01T10:00:00.000Z"
                })
            })
            .collect();
        Self {
            status: 200,
            body: serde_json::json!({ "files": files }).to_string(),
            tokens: Mutex::new(Vec::new()),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            status,
            body: r#"{"error":{"code":500,"message":"Backend Error"}}"#.to_string(),
            tokens: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpClient for FakeDrive {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let token = request
            .headers
            .get("Authorization")
            .cloned()
            .unwrap_or_default();
        self.tokens.lock().unwrap().push(token);
        Ok(HttpResponse {
            status: self.status,
            headers: HashMap::new(),
            body: Bytes::from(self.body.clone()),
        })
    }
}

fn build(
    identity: Arc<ScriptedIdentity>,
    drive: Arc<FakeDrive>,
    clock: Arc<ManualClock>,
) -> RecentFilesService {
    let builder = DemoConfig::builder()
        .client_id("demo-client.apps.googleusercontent.com")
        .identity_provider(identity)
        .http_client(drive)
        .clock(clock);
    RecentFilesService::bootstrap(builder).unwrap()
}

const FIVE: [&str; 5] = ["Budget", "Notes", "Slides", "Photo", "Contract"];

#[tokio::test]
async fn test_fresh_session_lists_files_and_reuses_token() {
    let identity = Arc::new(ScriptedIdentity::granting(&["T"]));
    let drive = Arc::new(FakeDrive::listing(&FIVE));
    let clock = Arc::new(ManualClock::at(START_MS));
    let service = build(identity.clone(), drive.clone(), clock.clone());

    let view = service.fetch(&ViewState::new().begin_loading()).await;
    assert_eq!(view.file_names().collect::<Vec<_>>(), FIVE.to_vec());
    assert_eq!(view.error, None);
    assert!(!view.loading);

    clock.advance(59 * 60 * 1000);
    let view = service.fetch(&view.begin_loading()).await;
    assert_eq!(view.files.len(), 5);

    assert_eq!(identity.popups(), 1);
    assert_eq!(drive.calls(), 2);
    assert!(drive
        .tokens
        .lock()
        .unwrap()
        .iter()
        .all(|header| header == "Bearer T"));
}

#[tokio::test]
async fn test_expired_token_triggers_one_new_popup() {
    let identity = Arc::new(ScriptedIdentity::granting(&["first", "second"]));
    let drive = Arc::new(FakeDrive::listing(&["a"]));
    let clock = Arc::new(ManualClock::at(START_MS));
    let service = build(identity.clone(), drive.clone(), clock.clone());
    let mut events = service.event_bus().subscribe();

    service.fetch(&ViewState::new()).await;
    clock.advance(3_600_000 + 1);
    let view = service.fetch(&ViewState::new()).await;

    assert_eq!(view.files.len(), 1);
    assert_eq!(identity.popups(), 2);
    assert_eq!(
        drive.tokens.lock().unwrap().last().map(String::as_str),
        Some("Bearer second")
    );

    let mut expired = 0;
    while let Ok(event) = events.try_recv() {
        if event == CoreEvent::Auth(AuthEvent::CredentialExpired) {
            expired += 1;
        }
    }
    assert_eq!(expired, 1);
}

#[tokio::test]
async fn test_concurrent_fetches_share_one_popup() {
    let identity = Arc::new(ScriptedIdentity::granting(&["shared"]));
    let drive = Arc::new(FakeDrive::listing(&["x", "y"]));
    let clock = Arc::new(ManualClock::at(START_MS));
    let service = build(identity.clone(), drive.clone(), clock);

    let start = ViewState::new().begin_loading();
    let (left, right) = tokio::join!(service.fetch(&start), service.fetch(&start));

    assert_eq!(identity.popups(), 1);
    assert_eq!(left.files.len(), 2);
    assert_eq!(left, right);
    assert_eq!(drive.calls(), 2);
}

#[tokio::test]
async fn test_cancelled_popup_reports_and_next_fetch_retries() {
    let identity = Arc::new(ScriptedIdentity {
        grants: Mutex::new(VecDeque::from([
            Err(TokenRequestError::UserCancelled),
            Ok(TokenGrant {
                access_token: "late".to_string(),
                expires_in: 3600,
                scope: DEFAULT_SCOPE.to_string(),
            }),
        ])),
        ..ScriptedIdentity::default()
    });
    let drive = Arc::new(FakeDrive::listing(&["a", "b"]));
    let clock = Arc::new(ManualClock::at(START_MS));
    let service = build(identity.clone(), drive.clone(), clock);

    let view = service.fetch(&ViewState::new().begin_loading()).await;
    assert_eq!(
        view.error.as_deref(),
        Some("Authorization was cancelled before access was granted.")
    );
    assert_eq!(drive.calls(), 0);
    assert_eq!(service.auth_state(), AuthState::Unauthorized);
    assert!(service.credentials().current_credential().is_none());

    let view = service.fetch(&view.begin_loading()).await;
    assert_eq!(view.error, None);
    assert_eq!(view.files.len(), 2);
    assert_eq!(service.credentials().last_error(), None);
}

#[tokio::test]
async fn test_server_error_is_reported_without_reauthorizing() {
    let identity = Arc::new(ScriptedIdentity::granting(&["T"]));
    let drive = Arc::new(FakeDrive::failing(500));
    let clock = Arc::new(ManualClock::at(START_MS));
    let service = build(identity.clone(), drive.clone(), clock);
    let mut events = service.event_bus().subscribe();

    let view = service.fetch(&ViewState::new()).await;
    assert_eq!(view.error.as_deref(), Some("Drive returned an error (HTTP 500)."));
    assert!(view.files.is_empty());
    assert_eq!(identity.popups(), 1);

    let failures: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|event| matches!(event, CoreEvent::Files(FilesEvent::ListFailed { .. })))
        .collect();
    assert_eq!(failures.len(), 1);
}

#[tokio::test]
async fn test_revoke_clears_list_and_next_fetch_authorizes_again() {
    let identity = Arc::new(ScriptedIdentity::granting(&["T1", "T2"]));
    let drive = Arc::new(FakeDrive::listing(&FIVE));
    let clock = Arc::new(ManualClock::at(START_MS));
    let service = build(identity.clone(), drive.clone(), clock);

    let view = service.fetch(&ViewState::new()).await;
    assert_eq!(view.files.len(), 5);

    let view = service.revoke(&view).await;
    assert_eq!(view, ViewState::default());
    assert_eq!(*identity.revoked.lock().unwrap(), vec!["T1".to_string()]);
    assert_eq!(service.auth_state(), AuthState::Unauthorized);

    // Nothing held any more: a second revoke does not reach the provider.
    let view = service.revoke(&view).await;
    assert_eq!(view, ViewState::default());
    assert_eq!(identity.revoked.lock().unwrap().len(), 1);

    service.fetch(&view).await;
    assert_eq!(identity.popups(), 2);
}

#[tokio::test]
async fn test_unconfirmed_revoke_keeps_credential_and_list() {
    let identity = Arc::new(ScriptedIdentity {
        fail_revoke: true,
        ..ScriptedIdentity::granting(&["T"])
    });
    let drive = Arc::new(FakeDrive::listing(&["kept"]));
    let clock = Arc::new(ManualClock::at(START_MS));
    let service = build(identity.clone(), drive.clone(), clock);

    let view = service.fetch(&ViewState::new()).await;
    let view = service.revoke(&view).await;

    assert_eq!(view.file_names().collect::<Vec<_>>(), vec!["kept"]);
    assert!(view.error.is_some());
    assert_eq!(service.auth_state(), AuthState::Authorized);

    service.fetch(&view).await;
    assert_eq!(identity.popups(), 1);
}

#[tokio::test]
async fn test_pending_revoke_keeps_credential_until_confirmed() {
    let identity = Arc::new(ScriptedIdentity::granting(&["T"]));
    let drive = Arc::new(FakeDrive::listing(&["a", "b"]));
    let clock = Arc::new(ManualClock::at(START_MS));
    let service = build(identity.clone(), drive.clone(), clock);

    let view = service.fetch(&ViewState::new()).await;
    let mut events = service.event_bus().subscribe();

    let mut revoking = Box::pin(service.revoke(&view));
    assert!(futures::poll!(revoking.as_mut()).is_pending());

    assert!(service.credentials().current_credential().is_some());
    assert_eq!(service.auth_state(), AuthState::Authorized);
    assert!(identity.revoked.lock().unwrap().is_empty());
    assert!(events.try_recv().is_err());

    let view = revoking.await;
    assert_eq!(view, ViewState::default());
    assert_eq!(
        events.try_recv().ok(),
        Some(CoreEvent::Auth(AuthEvent::Revoked))
    );
}

#[tokio::test]
async fn test_revoke_overtaken_by_new_grant_leaves_view_alone() {
    let identity = Arc::new(ScriptedIdentity::granting(&["T1", "T2"]));
    let drive = Arc::new(FakeDrive::listing(&FIVE));
    let clock = Arc::new(ManualClock::at(START_MS));
    let service = build(identity.clone(), drive.clone(), clock.clone());

    let first = service.fetch(&ViewState::new()).await;
    let mut revoking = Box::pin(service.revoke(&first));
    assert!(futures::poll!(revoking.as_mut()).is_pending());

    clock.advance(3_600_000 + 1);
    let refreshed = service.fetch(&first.begin_loading()).await;
    assert_eq!(refreshed.files.len(), 5);
    let mut events = service.event_bus().subscribe();

    let view = revoking.await;
    assert_eq!(view, first);
    assert_eq!(*identity.revoked.lock().unwrap(), vec!["T1".to_string()]);
    assert_eq!(service.auth_state(), AuthState::Authorized);
    let held = service.credentials().current_credential().unwrap();
    assert_eq!(held.token.as_str(), "T2");
    assert!(std::iter::from_fn(|| events.try_recv().ok())
        .all(|event| event != CoreEvent::Auth(AuthEvent::Revoked)));

    service.fetch(&view).await;
    assert_eq!(identity.popups(), 2);
}
