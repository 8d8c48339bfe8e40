use qube::error::QubeError;
use thiserror::Error;

/// A interface for error handling in qube-server.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ServerError {
    /// Error in the socket.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The request is not valid JSON or does not match any setting.
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] serde_json::Error),
    /// The request has no `setting` field.
    #[error("Request has no setting")]
    MissingSetting,
    /// Error in the engine.
    #[error("{0}")]
    Qube(#[from] QubeError),
}
