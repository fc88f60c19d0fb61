//! Connection manager: supervised connect/reconnect lifecycle and the
//! receive loop that owns the connection's execution context.
//!
//! One supervisor task runs per bridge. It drives a bounded fixed-delay
//! connect cycle, performs the handshake that populates the session
//! snapshot, then enters a `tokio::select!` loop that multiplexes push
//! events (dispatched strictly in arrival order through the typed
//! registry), FIFO jobs from the dispatcher, and the shutdown signal.
//! Handler failures are contained and logged; they never unwind the
//! loop. On disconnect the session resets atomically and queued jobs
//! fail with [`NotConnected`](crate::CompanionError::NotConnected)
//! instead of running against a stale handle.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::dispatcher::{ActionDispatcher, Job, JobContext};
use crate::error::Result;
use crate::event::{BridgeEvent, PushEvent};
use crate::registry::{
    self, EventRoute, CURRENT_SUMMONER_PATH, GAMEFLOW_PHASE_PATH, REGION_LOCALE_PATH,
};
use crate::session::{SessionHandle, SessionWriter, SummonerIdentity};
use crate::transport::{ConnectionHandle, LocalApi, LocalConnector, Method};

/// Why the receive loop exited.
enum LoopExit {
    /// The shutdown signal fired.
    Shutdown,
    /// The local endpoint closed the stream cleanly.
    StreamClosed,
    /// The stream failed.
    StreamError(String),
}

/// Result of one connect cycle.
enum Establish {
    Connected(ConnectionHandle),
    Exhausted { attempts: u32 },
    Shutdown,
}

/// Supervisor entry point, spawned by
/// [`CompanionBridge::start`](crate::CompanionBridge::start).
pub(crate) async fn supervise(
    connector: Arc<dyn LocalConnector>,
    config: BridgeConfig,
    writer: SessionWriter,
    session: SessionHandle,
    dispatcher: ActionDispatcher,
    event_tx: mpsc::Sender<BridgeEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    debug!("connection supervisor started");

    loop {
        let handle = match establish(&*connector, &config, &event_tx, &mut shutdown_rx).await {
            Establish::Connected(handle) => handle,
            Establish::Exhausted { attempts } => {
                let error = crate::error::CompanionError::ConnectionExhausted { attempts };
                warn!(%error, "giving up on the local endpoint");
                emit_final(&event_tx, BridgeEvent::ConnectionExhausted { attempts }).await;
                return;
            }
            Establish::Shutdown => return,
        };

        emit(&event_tx, BridgeEvent::Connected).await;

        handshake(&*handle.api, &writer).await;

        let (job_tx, job_rx) = mpsc::unbounded_channel::<Job>();
        dispatcher.install(job_tx);
        emit(&event_tx, BridgeEvent::Ready).await;

        let exit = run_connection(
            handle,
            job_rx,
            &writer,
            &session,
            &mut shutdown_rx,
        )
        .await;

        // Teardown order matters: close the job slot first so new
        // invokes fail fast, then reset the snapshot in one commit.
        dispatcher.clear();
        writer.reset();

        let (reason, terminal) = match exit {
            LoopExit::Shutdown => (Some("client shut down".to_string()), true),
            LoopExit::StreamClosed => (None, false),
            LoopExit::StreamError(e) => (Some(e), false),
        };
        emit_final(&event_tx, BridgeEvent::Disconnected { reason }).await;

        if terminal || !config.reconnect {
            debug!("connection supervisor exiting");
            return;
        }
        info!("connection lost, starting a fresh connect cycle");
    }
}

/// Run the bounded connect cycle: fresh handle per attempt, fixed delay
/// between attempts, exhaustion after the configured bound.
async fn establish(
    connector: &dyn LocalConnector,
    config: &BridgeConfig,
    event_tx: &mpsc::Sender<BridgeEvent>,
    shutdown_rx: &mut oneshot::Receiver<()>,
) -> Establish {
    let max_attempts = config.connect_attempts;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let connected = tokio::select! {
            _ = &mut *shutdown_rx => return Establish::Shutdown,
            connected = connector.connect() => connected,
        };

        match connected {
            Ok(handle) => {
                info!(attempt, "connected to the local endpoint");
                return Establish::Connected(handle);
            }
            Err(e) => {
                warn!(
                    attempt,
                    max_attempts,
                    error = %e,
                    "local endpoint connect failed"
                );
                if attempt >= max_attempts {
                    return Establish::Exhausted { attempts: attempt };
                }
                emit(
                    event_tx,
                    BridgeEvent::ConnectRetry {
                        attempt,
                        max_attempts,
                    },
                )
                .await;
                tokio::select! {
                    _ = &mut *shutdown_rx => return Establish::Shutdown,
                    () = tokio::time::sleep(config.connect_retry_delay) => {}
                }
            }
        }
    }
}

/// Initial state population after a successful connect.
///
/// Each read is independent; a failed read leaves its field absent but
/// the session still becomes ready, mirroring how the client behaves
/// when a subsystem is briefly unavailable. All four fields commit in
/// one atomic update.
async fn handshake(api: &dyn LocalApi, writer: &SessionWriter) {
    let phase = match fetch_phase(api).await {
        Ok(phase) => phase,
        Err(e) => {
            warn!(error = %e, "initial phase read failed");
            None
        }
    };
    let identity = match fetch_identity(api).await {
        Ok(identity) => identity,
        Err(e) => {
            warn!(error = %e, "initial summoner fetch failed");
            None
        }
    };
    let region = match fetch_region(api).await {
        Ok(region) => region,
        Err(e) => {
            warn!(error = %e, "initial region fetch failed");
            None
        }
    };

    info!(?phase, ?identity, ?region, "handshake complete");
    writer.update(|s| {
        s.ready = true;
        s.phase = phase;
        s.identity = identity;
        s.region = region;
    });
}

/// The connection's execution context: push events, dispatched jobs and
/// the shutdown signal multiplexed over one `select!`.
async fn run_connection(
    mut handle: ConnectionHandle,
    mut job_rx: mpsc::UnboundedReceiver<Job>,
    writer: &SessionWriter,
    session: &SessionHandle,
    shutdown_rx: &mut oneshot::Receiver<()>,
) -> LoopExit {
    debug!("receive loop started");

    loop {
        tokio::select! {
            _ = &mut *shutdown_rx => {
                debug!("shutdown signal received");
                let _ = handle.events.close().await;
                return LoopExit::Shutdown;
            }

            incoming = handle.events.next_event() => {
                match incoming {
                    Some(Ok(event)) => {
                        dispatch_event(&*handle.api, writer, event).await;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "event stream failed");
                        return LoopExit::StreamError(e.to_string());
                    }
                    None => {
                        debug!("event stream closed by the local endpoint");
                        return LoopExit::StreamClosed;
                    }
                }
            }

            job = job_rx.recv() => {
                match job {
                    Some(job) => {
                        job(JobContext {
                            api: Arc::clone(&handle.api),
                            session: session.clone(),
                        })
                        .await;
                    }
                    // Dispatcher dropped entirely; nothing left to serve.
                    None => {
                        debug!("job channel closed, shutting down receive loop");
                        let _ = handle.events.close().await;
                        return LoopExit::Shutdown;
                    }
                }
            }
        }
    }
}

/// Route one push event through the registry. Handler failures are
/// logged and contained; unknown events are ignored explicitly.
async fn dispatch_event(api: &dyn LocalApi, writer: &SessionWriter, event: PushEvent) {
    match registry::resolve(&event.uri, event.kind) {
        Some(EventRoute::GameflowPhase) => {
            if let Err(e) = handle_phase_event(api, writer, event).await {
                warn!(error = %e, "phase handler failed");
            }
        }
        Some(EventRoute::Summoner) => {
            if let Err(e) = handle_summoner_event(api, writer, event).await {
                warn!(error = %e, "summoner handler failed");
            }
        }
        None => {
            debug!(uri = %event.uri, kind = ?event.kind, "ignoring unsubscribed event");
        }
    }
}

/// Phase push: a plain string payload is taken as-is; anything else
/// means re-fetch the endpoint rather than assume a shape.
async fn handle_phase_event(
    api: &dyn LocalApi,
    writer: &SessionWriter,
    event: PushEvent,
) -> Result<()> {
    let phase = match event.data {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => match fetch_phase(api).await {
            Ok(phase) => phase,
            Err(e) => {
                writer.update(|s| s.phase = None);
                return Err(e);
            }
        },
    };
    debug!(?phase, "game-flow phase changed");
    writer.update(|s| s.phase = phase);
    Ok(())
}

/// Summoner push: on partial payload (missing name or tag) re-fetch
/// the identity endpoint before giving up, then refresh the region.
/// Identity and region commit in a single update.
async fn handle_summoner_event(
    api: &dyn LocalApi,
    writer: &SessionWriter,
    event: PushEvent,
) -> Result<()> {
    let mut identity = identity_from_value(&event.data);
    if identity.is_none() {
        identity = fetch_identity(api).await?;
    }

    match fetch_region(api).await {
        Ok(region) => {
            info!(?identity, ?region, "summoner updated");
            writer.update(|s| {
                s.identity = identity;
                s.region = region;
            });
        }
        Err(e) => {
            warn!(error = %e, "region fetch failed, keeping previous region");
            info!(?identity, "summoner updated");
            writer.update(|s| s.identity = identity);
        }
    }
    Ok(())
}

// ── Endpoint reads ──────────────────────────────────────────────────

async fn fetch_phase(api: &dyn LocalApi) -> Result<Option<String>> {
    let response = api.request(Method::Get, GAMEFLOW_PHASE_PATH, None).await?;
    Ok(phase_from_value(&response.body))
}

async fn fetch_identity(api: &dyn LocalApi) -> Result<Option<SummonerIdentity>> {
    let response = api.request(Method::Get, CURRENT_SUMMONER_PATH, None).await?;
    if !response.is_success() {
        return Ok(None);
    }
    Ok(identity_from_value(&response.body))
}

async fn fetch_region(api: &dyn LocalApi) -> Result<Option<String>> {
    let response = api.request(Method::Get, REGION_LOCALE_PATH, None).await?;
    if !response.is_success() {
        return Ok(None);
    }
    Ok(response
        .body
        .get("region")
        .and_then(Value::as_str)
        .filter(|r| !r.is_empty())
        .map(str::to_uppercase))
}

fn phase_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn identity_from_value(value: &Value) -> Option<SummonerIdentity> {
    let name = nonempty_str(value.get("gameName"))?;
    let tag = nonempty_str(value.get("tagLine"))?;
    Some(SummonerIdentity { name, tag })
}

fn nonempty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ── Event emission ──────────────────────────────────────────────────

/// Emit a status event; if the channel is full, log and drop it rather
/// than block the connection context.
async fn emit(event_tx: &mpsc::Sender<BridgeEvent>, event: BridgeEvent) {
    match event_tx.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(dropped)) => {
            warn!(?dropped, "bridge event channel full, dropping event");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("bridge event channel closed, receiver dropped");
        }
    }
}

/// Emit an event that must never be dropped (`Disconnected`,
/// `ConnectionExhausted`): block on channel capacity instead.
async fn emit_final(event_tx: &mpsc::Sender<BridgeEvent>, event: BridgeEvent) {
    if event_tx.send(event).await.is_err() {
        debug!("bridge event channel closed, receiver dropped");
    }
}
