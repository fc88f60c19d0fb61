//! Shared session-state snapshot of the local client.
//!
//! A single [`SessionState`] instance lives for the process lifetime.
//! It is written exclusively by code running inside the connection's
//! event context, through the crate-private [`SessionWriter`]; every
//! other context reads a fully consistent copy via
//! [`SessionHandle::snapshot`]. The writer commits each mutation with
//! one `watch::Sender::send_modify` call, so a multi-field update from
//! a single handler invocation is observed atomically — a reader never
//! sees the identity from one event paired with the region of another.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The local player's display identity (`gameName` + `tagLine`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummonerIdentity {
    /// Display name, e.g. `"Ana"`.
    pub name: String,
    /// Tag line, e.g. `"NA1"`.
    pub tag: String,
}

impl std::fmt::Display for SummonerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.name, self.tag)
    }
}

/// Snapshot of the local client's session.
///
/// All fields start absent/`false` and are populated incrementally by
/// the handshake and by push-event handlers. The whole state resets to
/// default on every connection loss. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// True once the local control endpoint completed its handshake.
    pub ready: bool,
    /// Current game-flow phase, or `None` if unknown or unreachable.
    pub phase: Option<String>,
    /// Local player identity, or `None` until discovered.
    pub identity: Option<SummonerIdentity>,
    /// Normalized (upper-case) region code.
    pub region: Option<String>,
}

/// Cloneable read handle over the shared session state.
///
/// `snapshot` is cheap, synchronous and callable from any thread; it
/// never blocks the connection context and never returns a torn read.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<SessionState>,
}

impl SessionHandle {
    /// Return a fully consistent copy of the current session state.
    pub fn snapshot(&self) -> SessionState {
        self.rx.borrow().clone()
    }
}

/// Write half of the session state, owned by the connection context.
///
/// Only one writer exists and it is never used concurrently with
/// itself: every `update` runs to completion inside the single-threaded
/// event context before the next one starts.
#[derive(Debug)]
pub(crate) struct SessionWriter {
    tx: watch::Sender<SessionState>,
}

impl SessionWriter {
    /// Apply a mutation as one atomic commit.
    pub(crate) fn update(&self, mutate: impl FnOnce(&mut SessionState)) {
        self.tx.send_modify(mutate);
    }

    /// Reset every field to its initial absent state in one commit.
    ///
    /// Called on connection loss; readers observe either the old state
    /// or the fully reset one, never a half-reset mixture.
    pub(crate) fn reset(&self) {
        self.tx.send_replace(SessionState::default());
    }
}

/// Create the shared session state and its read/write halves.
pub(crate) fn session_pair() -> (SessionWriter, SessionHandle) {
    let (tx, rx) = watch::channel(SessionState::default());
    (SessionWriter { tx }, SessionHandle { rx })
}
