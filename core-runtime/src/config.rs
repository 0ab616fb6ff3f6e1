//! # Demo Configuration
//!
//! Holds the externally supplied settings and the host bridges the demo core
//! needs.
//!
//! ## Overview
//!
//! [`DemoConfig`] is built with [`DemoConfigBuilder`], which validates eagerly
//! so a misconfigured page fails at startup rather than on the first click.
//!
//! ## Required
//!
//! - OAuth client id (set directly, or read once from `GOOGLE_CLIENT_ID`)
//! - `IdentityProvider` - the host's token client
//!
//! ## Optional (with defaults)
//!
//! - `HttpClient` - desktop default: reqwest (`desktop-shims` feature)
//! - `Clock` - [`SystemClock`]
//! - scope - `drive.metadata.readonly`
//! - Drive API base URL - `https://www.googleapis.com/drive/v3`
//! - request timeout - 30 seconds
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::DemoConfig;
//! use std::sync::Arc;
//!
//! let config = DemoConfig::builder()
//!     .client_id_from_env()?
//!     .identity_provider(Arc::new(MyTokenClient::new()))
//!     .http_client(Arc::new(MyHttpClient))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{Clock, HttpClient, IdentityProvider, SystemClock};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Environment variable holding the OAuth client id.
pub const CLIENT_ID_ENV: &str = "GOOGLE_CLIENT_ID";

/// Read-only access to file metadata; the only scope the demo requests.
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/drive.metadata.readonly";

/// Google Drive API v3 base URL
pub const DEFAULT_DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Default per-request timeout for Drive calls
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Validated demo configuration.
#[derive(Clone)]
pub struct DemoConfig {
    /// OAuth client identifier registered with the identity provider
    pub client_id: String,

    /// Scope requested on every authorization round-trip
    pub scope: String,

    /// Drive API base URL, without trailing slash
    pub drive_api_base: String,

    /// Timeout applied to each Drive request
    pub request_timeout: Duration,

    pub http_client: Arc<dyn HttpClient>,

    pub identity_provider: Arc<dyn IdentityProvider>,

    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for DemoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoConfig")
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .field("drive_api_base", &self.drive_api_base)
            .field("request_timeout", &self.request_timeout)
            .field("http_client", &"HttpClient { ... }")
            .field("identity_provider", &"IdentityProvider { ... }")
            .field("clock", &"Clock { ... }")
            .finish()
    }
}

impl DemoConfig {
    /// Creates a new builder for constructing a `DemoConfig`.
    pub fn builder() -> DemoConfigBuilder {
        DemoConfigBuilder::default()
    }
}

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new()
        .map_err(|e| Error::missing("HttpClient", format!("default client failed: {}", e)))?;
    Ok(Arc::new(client))
}

#[cfg(not(all(feature = "desktop-shims", not(target_arch = "wasm32"))))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(Error::missing(
        "HttpClient",
        "HttpClient implementation is required to call the Drive API. \
         Desktop: enable the 'desktop-shims' feature to use ReqwestHttpClient. \
         Web: inject the fetch-based client from bridge-wasm.",
    ))
}

/// Builder for [`DemoConfig`].
#[derive(Default)]
pub struct DemoConfigBuilder {
    client_id: Option<String>,
    scope: Option<String>,
    drive_api_base: Option<String>,
    request_timeout: Option<Duration>,
    http_client: Option<Arc<dyn HttpClient>>,
    identity_provider: Option<Arc<dyn IdentityProvider>>,
    clock: Option<Arc<dyn Clock>>,
}

impl DemoConfigBuilder {
    /// Sets the OAuth client id.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Reads the OAuth client id from `GOOGLE_CLIENT_ID`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when the variable is unset or not valid unicode.
    pub fn client_id_from_env(self) -> Result<Self> {
        let client_id = std::env::var(CLIENT_ID_ENV).map_err(|e| {
            Error::Config(format!(
                "{} must hold the OAuth client id: {}",
                CLIENT_ID_ENV, e
            ))
        })?;
        Ok(self.client_id(client_id))
    }

    /// Overrides the requested scope.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Overrides the Drive API base URL (useful for pointing at a local stub).
    pub fn drive_api_base(mut self, base: impl Into<String>) -> Self {
        self.drive_api_base = Some(base.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = Some(provider);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validates the settings and produces a [`DemoConfig`].
    ///
    /// # Errors
    ///
    /// - `Error::Config` - missing/blank client id or scope, invalid base URL,
    ///   zero timeout
    /// - `Error::CapabilityMissing` - no identity provider, or no HTTP client
    ///   and no desktop default available
    pub fn build(self) -> Result<DemoConfig> {
        let client_id = self
            .client_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "OAuth client id is required. Use .client_id() or set {}.",
                    CLIENT_ID_ENV
                ))
            })?;

        let scope = match self.scope {
            Some(scope) if scope.trim().is_empty() => {
                return Err(Error::Config("Scope cannot be empty".to_string()));
            }
            Some(scope) => scope.trim().to_string(),
            None => DEFAULT_SCOPE.to_string(),
        };

        let drive_api_base =
            validate_base_url(self.drive_api_base.as_deref().unwrap_or(DEFAULT_DRIVE_API_BASE))?;

        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        if request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        let identity_provider = self.identity_provider.ok_or_else(|| {
            Error::missing(
                "IdentityProvider",
                "An identity provider is required to obtain access tokens. \
                 Web: inject the Google Identity Services client from bridge-wasm.",
            )
        })?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()) as Arc<dyn Clock>);

        Ok(DemoConfig {
            client_id,
            scope,
            drive_api_base,
            request_timeout,
            http_client,
            identity_provider,
            clock,
        })
    }
}

fn validate_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw)
        .map_err(|e| Error::Config(format!("Invalid Drive API base URL '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "Drive API base URL must be http(s), got '{}'",
            url.scheme()
        )));
    }

    Ok(raw.trim_end_matches('/').to_string())
}
