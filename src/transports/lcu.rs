//! Production transport against the League client's local control API.
//!
//! The local client exposes a REST API and a WebSocket push stream on a
//! loopback port it announces through its lockfile. Each
//! [`LcuConnector::connect`] call performs discovery from scratch:
//! read the lockfile, build a fresh authenticated REST client
//! ([`LcuClient`]) and a fresh subscribed event stream
//! ([`LcuEventStream`]). Nothing is reused across attempts.
//!
//! The endpoint presents a self-signed certificate, so both sides
//! accept invalid certs; authentication is HTTP basic with user
//! `riot` and the lockfile token.
//!
//! # Feature gate
//!
//! Only available with the `transport-lcu` feature (enabled by
//! default).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::error::{CompanionError, Result};
use crate::event::{EventKind, PushEvent};
use crate::registry::subscription_paths;
use crate::transport::{
    ConnectionHandle, EventStream, LocalApi, LocalConnector, LocalResponse, Method,
};

/// Bound on establishing the push stream during one connect attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Opcode of an outgoing subscribe frame.
const SUBSCRIBE_OPCODE: u64 = 5;

/// Opcode of an incoming push-event frame.
const EVENT_OPCODE: u64 = 8;

/// Type alias for the underlying WebSocket stream.
type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

// ── Lockfile ────────────────────────────────────────────────────────

/// Connection coordinates announced by the local client.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Lockfile {
    port: u16,
    token: String,
}

impl Lockfile {
    /// Parse lockfile contents: `name:pid:port:token:protocol`.
    fn parse(contents: &str) -> Result<Self> {
        let mut fields = contents.trim().splitn(5, ':');
        let _name = fields.next();
        let _pid = fields.next();
        let port = fields
            .next()
            .and_then(|p| p.parse::<u16>().ok())
            .ok_or_else(|| CompanionError::Connect("lockfile has no valid port field".into()))?;
        let token = fields
            .next()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CompanionError::Connect("lockfile has no token field".into()))?
            .to_string();
        Ok(Self { port, token })
    }

    /// Read and parse the lockfile at `path`.
    fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CompanionError::Connect(format!("cannot read {}: {e}", path.display())))?;
        Self::parse(&contents)
    }
}

// ── Connector ───────────────────────────────────────────────────────

/// [`LocalConnector`] that discovers the local client via its lockfile.
///
/// Holds a list of candidate lockfile paths; the first readable one
/// wins. A missing lockfile simply means the client is not running,
/// which the connection manager treats as a transient failure.
#[derive(Debug, Clone)]
pub struct LcuConnector {
    candidates: Vec<PathBuf>,
}

impl LcuConnector {
    /// Use a single explicit lockfile path.
    pub fn new(lockfile: impl Into<PathBuf>) -> Self {
        Self {
            candidates: vec![lockfile.into()],
        }
    }

    /// Use the platform-default install locations plus the working
    /// directory.
    pub fn from_default_paths() -> Self {
        let candidates = vec![
            PathBuf::from(r"C:\Riot Games\League of Legends\lockfile"),
            PathBuf::from("/Applications/League of Legends.app/Contents/LoL/lockfile"),
            PathBuf::from("lockfile"),
        ];
        Self { candidates }
    }

    fn discover(&self) -> Result<Lockfile> {
        for path in &self.candidates {
            if path.exists() {
                debug!(path = %path.display(), "found lockfile");
                return Lockfile::read(path);
            }
        }
        Err(CompanionError::Connect(
            "no lockfile found; is the client running?".into(),
        ))
    }
}

#[async_trait]
impl LocalConnector for LcuConnector {
    async fn connect(&self) -> Result<ConnectionHandle> {
        let lockfile = self.discover()?;
        let api = LcuClient::new(lockfile.port, &lockfile.token)?;
        let events = LcuEventStream::connect(lockfile.port, &lockfile.token).await?;
        Ok(ConnectionHandle {
            api: Arc::new(api),
            events: Box::new(events),
        })
    }
}

// ── REST client ─────────────────────────────────────────────────────

/// Request side of the local connection: REST over loopback TLS.
#[derive(Debug, Clone)]
pub struct LcuClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl LcuClient {
    /// Build a client for `https://127.0.0.1:{port}`.
    ///
    /// # Errors
    ///
    /// Returns [`CompanionError::Connect`] if the HTTP client cannot be
    /// constructed.
    pub fn new(port: u16, token: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| CompanionError::Connect(e.to_string()))?;
        Ok(Self {
            http,
            base_url: format!("https://127.0.0.1:{port}"),
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl LocalApi for LcuClient {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<LocalResponse> {
        let url = format!("{}{path}", self.base_url);
        let mut builder = match method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };
        builder = builder.basic_auth("riot", Some(&self.token));
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CompanionError::Transport(format!("{method} {path}: {e}")))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| CompanionError::Transport(format!("{method} {path}: {e}")))?;
        // Empty and non-JSON bodies flatten to Null; callers inspect
        // the status themselves.
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok(LocalResponse { status, body })
    }
}

// ── Push-event stream ───────────────────────────────────────────────

/// Push-event side of the local connection.
///
/// Subscribes to every registry path right after the WebSocket
/// handshake and decodes the endpoint's `[8, name, payload]` frames
/// into [`PushEvent`]s. Frames outside that shape are skipped.
///
/// # Cancel Safety
///
/// [`next_event`](EventStream::next_event) is cancel-safe: dropping its
/// future before completion does not lose frames, making it safe inside
/// `tokio::select!`.
pub struct LcuEventStream {
    stream: WsStream,
    closed: bool,
}

impl LcuEventStream {
    /// Connect to `wss://127.0.0.1:{port}` and subscribe to the
    /// registry paths.
    ///
    /// # Errors
    ///
    /// Returns [`CompanionError::Connect`] if the handshake or a
    /// subscribe frame fails, or [`CompanionError::Timeout`] if the
    /// deadline elapses. Both are transient to the connection manager.
    pub async fn connect(port: u16, token: &str) -> Result<Self> {
        let url = format!("wss://127.0.0.1:{port}/");
        let mut request = url
            .into_client_request()
            .map_err(|e| CompanionError::Connect(e.to_string()))?;

        let credentials =
            base64::engine::general_purpose::STANDARD.encode(format!("riot:{token}"));
        let authorization = HeaderValue::from_str(&format!("Basic {credentials}"))
            .map_err(|e| CompanionError::Connect(e.to_string()))?;
        request.headers_mut().insert("Authorization", authorization);

        let tls = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| CompanionError::Connect(e.to_string()))?;

        let connect = tokio_tungstenite::connect_async_tls_with_config(
            request,
            None,
            false,
            Some(Connector::NativeTls(tls)),
        );
        let (mut stream, _response) = tokio::time::timeout(CONNECT_TIMEOUT, connect)
            .await
            .map_err(|_| CompanionError::Timeout)?
            .map_err(|e| CompanionError::Connect(e.to_string()))?;

        debug!(port, "push stream established");

        for path in subscription_paths() {
            let frame = subscribe_frame(path);
            stream
                .send(Message::Text(frame.into()))
                .await
                .map_err(|e| CompanionError::Connect(format!("subscribe {path}: {e}")))?;
        }

        Ok(Self {
            stream,
            closed: false,
        })
    }
}

#[async_trait]
impl EventStream for LcuEventStream {
    async fn next_event(&mut self) -> Option<Result<PushEvent>> {
        loop {
            let message = match self.stream.next().await {
                Some(Ok(message)) => message,
                Some(Err(e)) => return Some(Err(CompanionError::Transport(e.to_string()))),
                None => return None,
            };

            match message {
                Message::Text(text) => {
                    if let Some(event) = decode_frame(&text) {
                        return Some(Ok(event));
                    }
                    // Subscription acks and empty keep-alives land here.
                    debug!("skipping non-event frame");
                }
                Message::Close(frame) => {
                    debug!(?frame, "received WebSocket close frame");
                    return None;
                }
                Message::Ping(_) | Message::Pong(_) => {
                    // tungstenite auto-queues pong replies.
                }
                Message::Binary(_) => {
                    warn!("received unexpected binary WebSocket frame, skipping");
                }
                Message::Frame(_) => {
                    // Never produced by the read half; kept for
                    // exhaustiveness against future Message variants.
                }
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.stream
            .close(None)
            .await
            .map_err(|e| CompanionError::Transport(e.to_string()))
    }
}

/// Subscription event name for a resource path:
/// `/lol-gameflow/v1/gameflow-phase` becomes
/// `OnJsonApiEvent_lol-gameflow_v1_gameflow-phase`.
fn event_name(path: &str) -> String {
    format!("OnJsonApiEvent{}", path.replace('/', "_"))
}

/// Outgoing subscribe frame for a resource path.
fn subscribe_frame(path: &str) -> String {
    Value::Array(vec![
        Value::from(SUBSCRIBE_OPCODE),
        Value::from(event_name(path)),
    ])
    .to_string()
}

/// Decode an incoming `[8, name, {uri, eventType, data}]` frame.
///
/// Returns `None` for anything that does not match the shape, including
/// subscription acknowledgements and unknown event kinds.
fn decode_frame(text: &str) -> Option<PushEvent> {
    let value: Value = serde_json::from_str(text).ok()?;
    let frame = value.as_array()?;
    if frame.first()?.as_u64()? != EVENT_OPCODE {
        return None;
    }
    let payload = frame.get(2)?;
    let uri = payload.get("uri")?.as_str()?.to_string();
    let kind: EventKind = serde_json::from_value(payload.get("eventType")?.clone()).ok()?;
    let data = payload.get("data").cloned().unwrap_or(Value::Null);
    Some(PushEvent { uri, kind, data })
}
