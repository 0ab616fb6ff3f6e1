//! # Host Bridge Traits
//!
//! Capability contracts the demo core needs from its host.
//!
//! ## Overview
//!
//! The core never talks to the browser, the identity provider, or the network
//! directly. Each of those is a trait defined here and implemented per host:
//!
//! | Capability | Desktop | Web |
//! |------------|---------|-----|
//! | [`HttpClient`](http::HttpClient) | `bridge-desktop` (reqwest) | `bridge-wasm` (`fetch`) |
//! | [`IdentityProvider`](identity::IdentityProvider) | test fakes | `bridge-wasm` (Google Identity Services) |
//! | [`Clock`](time::Clock) | [`SystemClock`](time::SystemClock) | [`SystemClock`](time::SystemClock) |
//! | [`LoggerSink`](time::LoggerSink) | [`ConsoleLogger`](time::ConsoleLogger) | browser console |
//!
//! Callback-style host APIs (popup token clients, revoke callbacks) are turned
//! into a single awaitable value with the [`callback`] one-shot bridge.
//!
//! ## Thread Safety
//!
//! Native implementations must be `Send + Sync`. On `wasm32` the bound is
//! dropped because browser handles are single-threaded; see
//! [`platform::PlatformSendSync`].

pub mod callback;
pub mod error;
pub mod http;
pub mod identity;
pub mod platform;
pub mod time;

pub use error::BridgeError;

pub use callback::{completion, CallbackDropped, Completer, Completion};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use identity::{IdentityProvider, TokenGrant, TokenRequestError};
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, SystemClock};
