//! Event types: push events from the local endpoint and status events
//! emitted to the bridge consumer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of change a push event describes.
///
/// The local endpoint sends these as capitalized strings
/// (`"Create"`, `"Update"`, `"Delete"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// The resource was created.
    Create,
    /// The resource changed.
    Update,
    /// The resource was removed.
    Delete,
}

/// An unsolicited push message from the local control endpoint.
#[derive(Debug, Clone)]
pub struct PushEvent {
    /// Resource path the event refers to, e.g.
    /// `/lol-gameflow/v1/gameflow-phase`.
    pub uri: String,
    /// What happened to the resource.
    pub kind: EventKind,
    /// Event payload; shape varies per endpoint and is not trusted.
    pub data: Value,
}

/// Status events emitted by the bridge on its bounded event channel.
///
/// These describe the connection lifecycle; session data itself is read
/// via [`SessionHandle::snapshot`](crate::SessionHandle::snapshot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// A connect attempt failed and another is scheduled.
    ConnectRetry {
        /// The attempt that just failed (1-based).
        attempt: u32,
        /// The configured attempt bound.
        max_attempts: u32,
    },
    /// A connection to the local endpoint was established.
    Connected,
    /// The handshake completed and the session snapshot is populated.
    Ready,
    /// The connection was lost or shut down.
    Disconnected {
        /// Human-readable reason, if one is known.
        reason: Option<String>,
    },
    /// Every connect attempt failed; no further attempts are scheduled.
    ///
    /// Emitted exactly once per exhausted connect cycle. Subsequent
    /// commands fail fast with
    /// [`NotConnected`](crate::CompanionError::NotConnected).
    ConnectionExhausted {
        /// Number of attempts made.
        attempts: u32,
    },
}
