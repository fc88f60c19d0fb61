//! Error types for the companion client.

use thiserror::Error;

/// Errors that can occur when using the companion client.
#[derive(Debug, Error)]
pub enum CompanionError {
    /// A single attempt to reach the local control endpoint failed.
    /// Transient; the connection manager retries up to its attempt bound.
    #[error("local endpoint connect error: {0}")]
    Connect(String),

    /// The connection manager gave up after exhausting its attempt bound.
    /// Terminal for this session; reported exactly once.
    #[error("gave up connecting to the local endpoint after {attempts} attempts")]
    ConnectionExhausted {
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// The local transport failed mid-request or mid-stream.
    #[error("local transport error: {0}")]
    Transport(String),

    /// A command was attempted while no live local connection exists.
    #[error("not connected to the local client")]
    NotConnected,

    /// No visible custom lobby matched the target identity.
    #[error("couldn't find {name}#{tag}'s lobby")]
    LobbyNotFound {
        /// Target owner's display name.
        name: String,
        /// Target owner's tag line.
        tag: String,
    },

    /// The lobby join call was rejected by the local endpoint.
    #[error("failed to join: {message}")]
    JoinFailed {
        /// Message extracted from the join error body.
        message: String,
    },

    /// A remote backend call failed at the network level (including
    /// timeout). Never retried automatically; the caller decides.
    #[error("remote request error: {0}")]
    RemoteRequest(String),

    /// The remote backend answered with an unexpected HTTP status.
    #[error("remote backend returned status {status}")]
    RemoteStatus {
        /// HTTP status code of the response.
        status: u16,
    },

    /// The remote backend returned a payload with an unexpected shape.
    #[error("malformed remote response: {detail}")]
    MalformedResponse {
        /// What was wrong with the payload.
        detail: String,
    },

    /// Failed to serialize or deserialize a wire payload.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An operation timed out.
    #[error("operation timed out")]
    Timeout,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized [`Result`] type for companion client operations.
pub type Result<T> = std::result::Result<T, CompanionError>;
