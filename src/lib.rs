//! # League Companion
//!
//! Companion client bridging the League client's local control API to
//! the League of Leagues matchmaking service.
//!
//! The crate attaches to the locally running client, tracks its session
//! state in real time, and lets user-triggered commands (registration,
//! lobby join) correlate with that live state safely across execution
//! contexts.
//!
//! ## Features
//!
//! - **Supervised connection** — bounded fixed-delay retry, automatic
//!   reconnect, graceful shutdown
//! - **Consistent snapshots** — [`SessionHandle::snapshot`] never
//!   returns a torn read, from any thread
//! - **Cross-context dispatch** — [`ActionDispatcher::invoke`] runs
//!   commands inside the connection's execution context in FIFO order
//! - **Lobby join sequencing** — match a remote-issued [`JoinRequest`]
//!   to a visible custom lobby and join it
//! - **LCU transport built-in** — default `transport-lcu` feature
//!   provides lockfile discovery, authenticated REST and the wss push
//!   stream
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use league_companion::{BridgeConfig, BridgeEvent, CompanionBridge, LcuConnector};
//!
//! let connector = LcuConnector::from_default_paths();
//! let (bridge, mut events) = CompanionBridge::start(connector, BridgeConfig::new());
//!
//! while let Some(event) = events.recv().await {
//!     if let BridgeEvent::Ready = event {
//!         println!("session: {:?}", bridge.snapshot());
//!     }
//! }
//! ```

pub mod bridge;
pub mod config;
mod connection;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod lobby;
pub mod registry;
pub mod remote;
pub mod session;
pub mod transport;
pub mod transports;

// Re-export primary types for ergonomic imports.
pub use bridge::CompanionBridge;
pub use config::BridgeConfig;
pub use dispatcher::{ActionDispatcher, JobContext, JobTicket};
pub use error::{CompanionError, Result};
pub use event::{BridgeEvent, EventKind, PushEvent};
pub use lobby::{JoinRequest, LobbyDescriptor};
pub use remote::{AuthOutcome, RemoteClient};
pub use session::{SessionHandle, SessionState, SummonerIdentity};
pub use transport::{ConnectionHandle, EventStream, LocalApi, LocalConnector, LocalResponse, Method};

#[cfg(feature = "transport-lcu")]
pub use transports::LcuConnector;
