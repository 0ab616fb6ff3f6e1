//! Identity Provider Abstraction
//!
//! The host owns the provider's popup, consent screen and token issuance. The
//! core only sees the outcome of one round-trip: a grant, or a reason it failed.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::error::Result;
use crate::platform::PlatformSendSync;

/// Successful token response from the identity provider.
///
/// Mirrors the implicit-grant token response: the access token, its lifetime in
/// seconds, and the space-separated list of scopes the user actually granted
/// (which may be narrower than what was requested).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub scope: String,
}

impl TokenGrant {
    /// Iterate over the individual granted scopes.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.split_whitespace()
    }

    /// Whether the grant includes `scope`.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes().any(|granted| granted == scope)
    }
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Reasons a token request produced no grant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenRequestError {
    /// The user closed the popup or declined consent.
    #[error("user cancelled the authorization popup")]
    UserCancelled,

    /// The popup could not be opened or failed before reporting a result.
    #[error("authorization popup failed: {0}")]
    PopupFailed(String),

    /// The provider answered with an OAuth error code.
    #[error("provider returned {error}{}", describe(.description))]
    Provider {
        error: String,
        description: Option<String>,
    },
}

impl TokenRequestError {
    /// Map an OAuth error code reported by the provider.
    ///
    /// `access_denied` and the popup-closed codes mean the user walked away,
    /// everything else is a provider-side failure.
    pub fn from_oauth_error(error: impl Into<String>, description: Option<String>) -> Self {
        let error = error.into();
        match error.as_str() {
            "access_denied" | "popup_closed" | "popup_closed_by_user" | "user_cancel" => {
                TokenRequestError::UserCancelled
            }
            "popup_failed_to_open" => TokenRequestError::PopupFailed(
                description.unwrap_or_else(|| "popup blocked".to_string()),
            ),
            _ => TokenRequestError::Provider { error, description },
        }
    }
}

fn describe(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

/// Identity provider capability.
///
/// # Contract
///
/// - `request_token` resolves exactly once per call, even when the user
///   dismisses the popup (as [`TokenRequestError::UserCancelled`]).
/// - `revoke_token` resolves `Ok(())` only after the provider confirmed the
///   revocation.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::identity::IdentityProvider;
///
/// async fn authorize(idp: &dyn IdentityProvider) {
///     match idp.request_token("client-id", "scope").await {
///         Ok(grant) => println!("expires in {}s", grant.expires_in),
///         Err(reason) => println!("denied: {reason}"),
///     }
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait IdentityProvider: PlatformSendSync {
    /// Run one authorization round-trip for `scope` on behalf of `client_id`.
    async fn request_token(
        &self,
        client_id: &str,
        scope: &str,
    ) -> std::result::Result<TokenGrant, TokenRequestError>;

    /// Revoke `token` with the provider.
    async fn revoke_token(&self, token: &str) -> Result<()>;
}
