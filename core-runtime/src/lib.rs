//! # Core Runtime Module
//!
//! Ambient infrastructure shared by the demo crates:
//! - Logging and tracing setup
//! - Configuration (client id, scope, endpoints, injected bridges)
//! - Event bus for auth and listing notifications
//!
//! ## Overview
//!
//! Nothing in here knows about credentials or Drive; `core-auth`,
//! `provider-google-drive` and `core-service` build on these pieces.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
