use thiserror::Error;

use crate::session::SessionError;

/// Errors returned by the synchronous client operations
///
/// Failures discovered asynchronously by the drive worker are not represented
/// here; they are delivered through the registered error callback and retained
/// by [`SpeechClient::last_drive_error`](crate::SpeechClient::last_drive_error).
#[derive(Error, Debug)]
pub enum ClientError {
    /// Malformed or incompatible arguments, including a callback set whose
    /// declared version or size does not match this library
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The handle has already been shut down
    #[error("invalid handle: client is already shut down")]
    InvalidHandle,

    /// Opening or configuring the session failed during connect
    #[error("failed to initialize connection: {0}")]
    Initialization(#[source] SessionError),

    /// The background drive worker could not be spawned
    #[error("failed to start drive worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The operation requires a live session and there is none
    #[error("no live session: client is not initialized")]
    Uninitialized,

    /// The audio sink rejected a write or flush
    #[error("failed to write audio: {0}")]
    Write(#[source] SessionError),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
