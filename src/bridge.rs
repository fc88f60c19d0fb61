//! The companion bridge: public entry point tying the connection
//! manager, session state and dispatcher together.
//!
//! [`CompanionBridge::start`] spawns the background supervisor task and
//! returns a thin handle plus a bounded receiver of
//! [`BridgeEvent`] status updates. The handle is what the UI shell
//! consumes: synchronous [`snapshot`](CompanionBridge::snapshot) reads,
//! [`join_lobby`](CompanionBridge::join_lobby) scheduling, and a
//! graceful [`shutdown`](CompanionBridge::shutdown).
//!
//! # Example
//!
//! ```rust,ignore
//! let connector = LcuConnector::from_default_paths();
//! let (bridge, mut events) = CompanionBridge::start(connector, BridgeConfig::new());
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         BridgeEvent::Ready => println!("client ready: {:?}", bridge.snapshot()),
//!         BridgeEvent::ConnectionExhausted { .. } => break,
//!         _ => {}
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::connection::supervise;
use crate::dispatcher::{ActionDispatcher, JobTicket};
use crate::event::BridgeEvent;
use crate::lobby::{self, JoinRequest};
use crate::session::{session_pair, SessionHandle, SessionState, SummonerIdentity};
use crate::transport::LocalConnector;

/// Handle over a running companion bridge.
///
/// Created via [`CompanionBridge::start`]. Cheap accessors are callable
/// from any thread; none of them block on the connection context.
pub struct CompanionBridge {
    session: SessionHandle,
    dispatcher: ActionDispatcher,
    /// Handle to the background supervisor task.
    task: Option<tokio::task::JoinHandle<()>>,
    /// Oneshot sender signaling the supervisor to shut down gracefully.
    shutdown_tx: Option<oneshot::Sender<()>>,
    shutdown_timeout: Duration,
}

impl CompanionBridge {
    /// Start the bridge and return a handle plus the status event
    /// receiver.
    ///
    /// The supervisor immediately begins its connect cycle against the
    /// given connector. Must be called within a tokio runtime.
    #[must_use = "the event receiver must be used to observe bridge status"]
    pub fn start(
        connector: impl LocalConnector,
        config: BridgeConfig,
    ) -> (Self, mpsc::Receiver<BridgeEvent>) {
        // Clamp capacity to at least 1 (tokio panics on 0).
        let capacity = config.event_channel_capacity.max(1);
        let (event_tx, event_rx) = mpsc::channel::<BridgeEvent>(capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let (writer, session) = session_pair();
        let dispatcher = ActionDispatcher::new();
        let shutdown_timeout = config.shutdown_timeout;

        let task = tokio::spawn(supervise(
            Arc::new(connector),
            config,
            writer,
            session.clone(),
            dispatcher.clone(),
            event_tx,
            shutdown_rx,
        ));

        let bridge = Self {
            session,
            dispatcher,
            task: Some(task),
            shutdown_tx: Some(shutdown_tx),
            shutdown_timeout,
        };

        (bridge, event_rx)
    }

    /// Return a fully consistent copy of the current session state.
    ///
    /// Never blocks and never returns a torn read.
    pub fn snapshot(&self) -> SessionState {
        self.session.snapshot()
    }

    /// True once the local handshake completed.
    pub fn is_ready(&self) -> bool {
        self.snapshot().ready
    }

    /// Clone the session read handle for a collaborator.
    pub fn session(&self) -> SessionHandle {
        self.session.clone()
    }

    /// Clone the dispatcher for scheduling custom commands into the
    /// connection's execution context.
    pub fn dispatcher(&self) -> ActionDispatcher {
        self.dispatcher.clone()
    }

    /// Schedule the lobby join sequence for `request` inside the
    /// connection's execution context.
    ///
    /// The ticket resolves with the joined owner's identity, or a typed
    /// failure ([`LobbyNotFound`](crate::CompanionError::LobbyNotFound),
    /// [`JoinFailed`](crate::CompanionError::JoinFailed),
    /// [`NotConnected`](crate::CompanionError::NotConnected), ...).
    #[must_use = "the ticket must be polled to observe the join outcome"]
    pub fn join_lobby(&self, request: JoinRequest) -> JobTicket<SummonerIdentity> {
        self.dispatcher
            .invoke(move |ctx| async move { lobby::join_lobby(&ctx, request).await })
    }

    /// Shut down the bridge, closing the connection and stopping the
    /// supervisor task.
    ///
    /// The event receiver yields a final `Disconnected` and then `None`
    /// once the supervisor exits.
    pub async fn shutdown(&mut self) {
        debug!("CompanionBridge: shutdown requested");

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        // Await the supervisor with a timeout. If it doesn't exit in
        // time, abort it so the task cannot detach and run indefinitely.
        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!("supervisor terminated with join error: {join_err}");
                }
                Err(_) => {
                    warn!("supervisor did not exit within timeout; aborting task");
                    task.abort();
                    if let Err(join_err) = task.await {
                        debug!("supervisor aborted: {join_err}");
                    }
                }
            }
        }

        self.dispatcher.clear();
    }
}

impl std::fmt::Debug for CompanionBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompanionBridge")
            .field("ready", &self.is_ready())
            .field("connected", &self.dispatcher.is_connected())
            .field("has_task", &self.task.is_some())
            .finish()
    }
}

impl Drop for CompanionBridge {
    fn drop(&mut self) {
        // `Drop` is synchronous so a graceful shutdown cannot be
        // awaited here; aborting drops the supervisor future
        // immediately. The shutdown oneshot is intentionally not sent:
        // the graceful path closes the transport asynchronously and
        // there is no executor context to drive it inside `Drop`.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
