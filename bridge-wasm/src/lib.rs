//! WebAssembly Bridge Implementations
//!
//! Browser implementations of the `bridge-traits` capabilities:
//!
//! - [`WasmHttpClient`]: `fetch` with `AbortController` timeouts
//! - [`GoogleTokenClient`]: Google Identity Services token client
//!   (`google.accounts.oauth2`), which must already be loaded on the page
//!
//! # Platform Support
//!
//! Compiles to nothing outside `wasm32-unknown-unknown`.
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::{GoogleTokenClient, WasmHttpClient};
//! use std::sync::Arc;
//!
//! let http = Arc::new(WasmHttpClient::new()?);
//! let identity = Arc::new(GoogleTokenClient::new());
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod error;
pub mod http;
pub mod identity;

pub use error::js_error_message;
pub use http::WasmHttpClient;
pub use identity::GoogleTokenClient;

/// Route Rust panics to `console.error`. Safe to call more than once.
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}
