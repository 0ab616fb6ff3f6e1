use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The request never produced a response (DNS, connect, TLS, timeout, CORS).
    #[error("Network request failed: {0}")]
    Network(String),
}

impl BridgeError {
    /// The host-supplied text without the bridge-layer prefix.
    pub fn detail(&self) -> &str {
        match self {
            BridgeError::NotAvailable(detail)
            | BridgeError::OperationFailed(detail)
            | BridgeError::Network(detail) => detail,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
