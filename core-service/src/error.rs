use thiserror::Error;

/// Failures surfaced by the recent-files workflow.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Authorization error: {0}")]
    Auth(#[from] core_auth::AuthError),

    #[error("Drive listing error: {0}")]
    Files(#[from] provider_google_drive::ResourceListError),
}

impl CoreError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Config(err) => err.to_string(),
            CoreError::Auth(err) => err.user_message(),
            CoreError::Files(err) => err.user_message(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
