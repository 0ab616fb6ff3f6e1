use crate::types::DenialReason;
use thiserror::Error;

/// Errors returned by the credential manager.
///
/// `Clone` because one in-flight authorization hands the same outcome to
/// every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    AuthorizationDenied(DenialReason),

    /// The provider did not confirm revocation; the credential is kept.
    #[error("Revoking access failed: {0}")]
    RevocationFailed(String),
}

impl AuthError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
