//! Error types for the Drive listing call

use serde::Serialize;
use thiserror::Error;

/// Why listing recent files failed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ResourceListError {
    /// Drive rejected the credential (HTTP 401 or 403).
    #[error("Drive rejected the credential (status {status})")]
    Unauthorized { status: u16 },

    /// Drive answered with an error status, or with a body that is not a file list.
    #[error("Drive API error (status {status}): {message}")]
    ServerError { status: u16, message: String },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ResourceListError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ResourceListError::Unauthorized { .. } => {
                "Access to Drive was rejected; authorize again to refresh access.".to_string()
            }
            ResourceListError::ServerError { status, .. } => {
                format!("Drive returned an error (HTTP {}).", status)
            }
            ResourceListError::NetworkError(_) => {
                "Could not reach Drive; check your connection.".to_string()
            }
        }
    }
}

/// Result type for Drive listing operations
pub type Result<T> = std::result::Result<T, ResourceListError>;
