//! Workspace umbrella crate.
//!
//! Re-exports `core-service` behind the same feature flags, so a host can
//! depend on one crate and pick `desktop-shims` (native) or `wasm` (browser).

#[cfg(any(feature = "desktop-shims", feature = "wasm"))]
pub use core_service::*;
