//! # Event Bus
//!
//! Typed notifications between the credential manager, the Drive listing
//! workflow and whatever renders the page, over `tokio::sync::broadcast`.
//!
//! ```text
//! ┌──────────────────┐  emit   ┌──────────┐  subscribe  ┌────────────┐
//! │ CredentialManager├────────>│          ├────────────>│ Page / log │
//! └──────────────────┘         │ EventBus │             └────────────┘
//! ┌──────────────────┐  emit   │          │
//! │ RecentFilesSvc   ├────────>│          │
//! └──────────────────┘         └──────────┘
//! ```
//!
//! Emitting with no subscribers is not an error for producers; they ignore the
//! `SendError`. Slow subscribers see `RecvError::Lagged` and may keep reading.
//!
//! ```rust
//! use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
//!
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//! bus.emit(CoreEvent::Auth(AuthEvent::Revoked)).ok();
//! assert_eq!(rx.try_recv().unwrap(), CoreEvent::Auth(AuthEvent::Revoked));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default per-subscriber buffer.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 64;

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Auth(AuthEvent),
    Files(FilesEvent),
}

impl CoreEvent {
    /// Short human-readable description, used for log lines.
    pub fn description(&self) -> &'static str {
        match self {
            CoreEvent::Auth(e) => e.description(),
            CoreEvent::Files(e) => e.description(),
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Auth(AuthEvent::AuthorizationDenied { .. }) => EventSeverity::Warning,
            CoreEvent::Files(FilesEvent::ListFailed { .. }) => EventSeverity::Error,
            CoreEvent::Auth(AuthEvent::Authorized { .. })
            | CoreEvent::Auth(AuthEvent::Revoked)
            | CoreEvent::Files(FilesEvent::Listed { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Credential lifecycle events. Never carry the bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// An authorization round-trip started.
    Authorizing,
    /// A credential was granted.
    Authorized {
        /// Absolute expiry in clock milliseconds.
        expires_at_ms: i64,
    },
    /// The round-trip ended without a credential.
    AuthorizationDenied {
        /// User-facing message for the denial.
        message: String,
    },
    /// A stored credential was found expired and discarded.
    CredentialExpired,
    /// The credential was revoked with the provider. Cached file lists
    /// derived from it should be dropped.
    Revoked,
}

impl AuthEvent {
    fn description(&self) -> &'static str {
        match self {
            AuthEvent::Authorizing => "Authorization in progress",
            AuthEvent::Authorized { .. } => "Authorization granted",
            AuthEvent::AuthorizationDenied { .. } => "Authorization denied",
            AuthEvent::CredentialExpired => "Credential expired",
            AuthEvent::Revoked => "Credential revoked",
        }
    }
}

/// Drive listing events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum FilesEvent {
    Listed { count: usize },
    ListFailed { message: String },
}

impl FilesEvent {
    fn description(&self) -> &'static str {
        match self {
            FilesEvent::Listed { .. } => "Recent files listed",
            FilesEvent::ListFailed { .. } => "Listing recent files failed",
        }
    }
}

/// Broadcast bus. Cloning shares the underlying channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event, returning how many subscribers received it.
    ///
    /// Fails only when nobody is subscribed.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// New receiver for all future events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
