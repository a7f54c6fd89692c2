//! Synced store error types.

use thiserror::Error;

/// Errors surfaced by a synced collection.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The device could not reach the backend.
    #[error("network error: {0}")]
    Network(String),

    /// The session is missing or was rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The local sync engine failed.
    #[error("sync engine error: {0}")]
    Engine(String),

    /// The transport to the backend returned an error.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend client is misconfigured.
    #[error("configuration error: {0}")]
    Config(String),

    /// The request timed out.
    #[error("request timed out")]
    Timeout,

    /// Any other backend error.
    #[error("{0}")]
    Service(String),
}
