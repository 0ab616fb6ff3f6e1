//! # Desktop Bridge Implementations
//!
//! Native implementations of the bridge traits used when the demo core runs
//! outside the browser (integration tests, desktop shells):
//! - `HttpClient` using `reqwest`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new()?);
//! ```

mod http;

pub use http::ReqwestHttpClient;
