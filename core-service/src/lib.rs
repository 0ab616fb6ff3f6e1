//! Recent files workflow.
//!
//! Connects the credential lifecycle from `core-auth` to the Drive listing
//! from `provider-google-drive`, and exposes the two triggers the page fires:
//! fetch and revoke. Each trigger maps one immutable [`ViewState`] to the next.
//!
//! Native hosts enable `desktop-shims` for the reqwest HTTP client; browser
//! builds enable `wasm`, which adds the [`wasm`] bindings backed by
//! `bridge-wasm`.

pub mod error;
pub mod service;
pub mod view;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

pub use error::{CoreError, Result};
pub use service::RecentFilesService;
pub use view::ViewState;

pub use core_auth::{AuthState, CredentialManager};
pub use core_runtime::config::{DemoConfig, DemoConfigBuilder};
pub use provider_google_drive::FileSummary;
