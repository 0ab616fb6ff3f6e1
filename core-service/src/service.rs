//! The fetch and revoke triggers of the page.
//!
//! A fetch always finishes authorizing before the listing call goes out, and
//! a rejected listing (401/403) is reported rather than answered with another
//! authorization popup. The next explicit fetch decides whether to try again.

use std::sync::Arc;

use core_auth::{AuthState, CredentialManager, Revocation};
use core_runtime::config::{DemoConfig, DemoConfigBuilder};
use core_runtime::events::{CoreEvent, EventBus, FilesEvent};
use provider_google_drive::{DriveFilesClient, FileSummary};
use tracing::{info, instrument, warn};

use crate::error::{CoreError, Result};
use crate::view::ViewState;

/// Wires the credential manager to the Drive client.
pub struct RecentFilesService {
    credentials: Arc<CredentialManager>,
    drive: DriveFilesClient,
    event_bus: EventBus,
}

impl RecentFilesService {
    pub fn new(
        credentials: Arc<CredentialManager>,
        drive: DriveFilesClient,
        event_bus: EventBus,
    ) -> Self {
        Self {
            credentials,
            drive,
            event_bus,
        }
    }

    /// Builds both components from one validated configuration, sharing a
    /// fresh event bus.
    pub fn from_config(config: &DemoConfig) -> Self {
        let event_bus = EventBus::default();
        let credentials = CredentialManager::from_config(config, event_bus.clone());
        Self::new(
            Arc::new(credentials),
            DriveFilesClient::from_config(config),
            event_bus,
        )
    }

    /// Validates `builder` and builds the service from it.
    ///
    /// # Errors
    ///
    /// `CoreError::Config` when the configuration is incomplete or invalid.
    pub fn bootstrap(builder: DemoConfigBuilder) -> Result<Self> {
        let config = builder.build()?;
        info!(client_id = %config.client_id, scope = %config.scope, "Recent files service ready");
        Ok(Self::from_config(&config))
    }

    /// Authorizes if needed, then lists the ten most recently modified files.
    ///
    /// # Errors
    ///
    /// - `CoreError::Auth` - no credential could be obtained; nothing was listed
    /// - `CoreError::Files` - the listing call failed
    #[instrument(skip(self))]
    pub async fn list_recent_files(&self) -> Result<Vec<FileSummary>> {
        let credential = self.credentials.ensure_authorized().await?;

        match self.drive.list_recent_files(&credential).await {
            Ok(files) => {
                self.emit(FilesEvent::Listed { count: files.len() });
                Ok(files)
            }
            Err(err) => {
                warn!(error = %err, "Listing recent files failed");
                self.emit(FilesEvent::ListFailed {
                    message: err.user_message(),
                });
                Err(err.into())
            }
        }
    }

    /// The "fetch" trigger.
    ///
    /// An authorization failure shows the manager's recorded message and keeps
    /// whatever list was displayed; a listing failure clears the list.
    pub async fn fetch(&self, view: &ViewState) -> ViewState {
        match self.list_recent_files().await {
            Ok(files) => view.with_files(files),
            Err(CoreError::Auth(err)) => {
                let message = self
                    .credentials
                    .last_error()
                    .unwrap_or_else(|| err.user_message());
                view.with_error(message)
            }
            Err(err) => view.cleared().with_error(err.user_message()),
        }
    }

    /// The "revoke" trigger.
    ///
    /// The list disappears only once the provider confirmed the revocation.
    pub async fn revoke(&self, view: &ViewState) -> ViewState {
        match self.credentials.revoke().await {
            Ok(Revocation::Revoked) => view.cleared(),
            Ok(Revocation::NothingToRevoke | Revocation::Superseded) => view.clone(),
            Err(err) => view.with_error(CoreError::from(err).user_message()),
        }
    }

    pub fn auth_state(&self) -> AuthState {
        self.credentials.state()
    }

    pub fn credentials(&self) -> &Arc<CredentialManager> {
        &self.credentials
    }

    pub fn drive(&self) -> &DriveFilesClient {
        &self.drive
    }

    /// Bus carrying both authorization and listing events.
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    fn emit(&self, event: FilesEvent) {
        let _ = self.event_bus.emit(CoreEvent::Files(event));
    }
}

impl std::fmt::Debug for RecentFilesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecentFilesService")
            .field("credentials", &self.credentials)
            .field("event_bus", &self.event_bus)
            .finish_non_exhaustive()
    }
}
