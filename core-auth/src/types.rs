use bridge_traits::identity::{TokenGrant, TokenRequestError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque bearer token.
///
/// Never printed: `Debug` is redacted and there is no `Display`. Use
/// [`BearerToken::as_str`] at the single place the value is put on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

/// A bearer token together with its absolute expiry.
///
/// Only created by a successful authorization round-trip. The manager holds
/// `Option<Credential>`, so a token without an expiry cannot exist.
///
/// # Examples
///
/// ```
/// use core_auth::{BearerToken, Credential};
///
/// let credential = Credential::new(BearerToken::new("ya29.a0"), 3_600_000, vec![]);
/// assert!(credential.is_valid_at(3_599_999));
/// assert!(!credential.is_valid_at(3_600_000));
/// assert!(!format!("{:?}", credential).contains("ya29"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: BearerToken,
    /// Expiry in clock milliseconds; valid strictly before this instant.
    pub expires_at_ms: i64,
    pub granted_scopes: Vec<String>,
}

impl Credential {
    pub fn new(token: BearerToken, expires_at_ms: i64, granted_scopes: Vec<String>) -> Self {
        Self {
            token,
            expires_at_ms,
            granted_scopes,
        }
    }

    /// Valid iff `now_ms < expires_at_ms`. Equality counts as expired.
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.granted_scopes.iter().any(|granted| granted == scope)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &self.token)
            .field("expires_at_ms", &self.expires_at_ms)
            .field("granted_scopes", &self.granted_scopes)
            .finish()
    }
}

/// Why an authorization round-trip produced no credential.
///
/// `Display` is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenialReason {
    /// The grant came back without the requested scope.
    #[error("Read-only access to your Drive file list was not granted.")]
    ScopeNotGranted,

    /// The user closed the popup or declined consent.
    #[error("Authorization was cancelled before access was granted.")]
    UserCancelled,

    #[error("Authorization failed: {0}")]
    ProviderError(String),
}

/// Classified result of one authorization round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    Granted {
        token: BearerToken,
        expires_in_seconds: u64,
        granted_scopes: Vec<String>,
    },
    Denied {
        reason: DenialReason,
    },
}

impl AuthorizationOutcome {
    /// Classify the identity provider's raw response for `requested_scope`.
    ///
    /// A grant lacking the requested scope is a denial, not a partial success.
    pub fn classify(
        response: Result<TokenGrant, TokenRequestError>,
        requested_scope: &str,
    ) -> Self {
        match response {
            Ok(grant) if grant.has_scope(requested_scope) => AuthorizationOutcome::Granted {
                granted_scopes: grant.scopes().map(str::to_string).collect(),
                expires_in_seconds: grant.expires_in,
                token: BearerToken::new(grant.access_token),
            },
            Ok(_) => AuthorizationOutcome::Denied {
                reason: DenialReason::ScopeNotGranted,
            },
            Err(TokenRequestError::UserCancelled) => AuthorizationOutcome::Denied {
                reason: DenialReason::UserCancelled,
            },
            Err(other) => AuthorizationOutcome::Denied {
                reason: DenialReason::ProviderError(other.to_string()),
            },
        }
    }
}

/// Credential lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthState {
    /// No valid credential and no round-trip running.
    Unauthorized,
    /// A round-trip is in flight.
    Authorizing,
    /// A credential is held (it may have expired since; checked on use).
    Authorized,
}

impl AuthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthState::Unauthorized => "unauthorized",
            AuthState::Authorizing => "authorizing",
            AuthState::Authorized => "authorized",
        }
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful call to `CredentialManager::revoke`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revocation {
    /// No token was held; the provider was not contacted.
    NothingToRevoke,
    Revoked,
    /// The provider revoked the token, but a newer grant replaced it while
    /// the call was pending. The newer credential is kept.
    Superseded,
}
