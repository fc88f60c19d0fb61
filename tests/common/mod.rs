#![allow(dead_code)]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Shared test utilities for companion bridge integration tests.
//!
//! Provides a scripted [`MockConnector`] producing mock connections: a
//! recording [`MockApi`] for the request side and a channel-driven
//! [`ChannelStream`] the test feeds push events through.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use league_companion::registry::{CURRENT_SUMMONER_PATH, GAMEFLOW_PHASE_PATH, REGION_LOCALE_PATH};
use league_companion::{
    BridgeConfig, CompanionError, ConnectionHandle, EventKind, EventStream, LocalApi,
    LocalConnector, LocalResponse, Method, PushEvent,
};

// ── MockApi ─────────────────────────────────────────────────────────

#[derive(Clone)]
enum Reply {
    Respond(u16, Value),
    Fail(String),
}

/// Recording request side with stubbed replies.
///
/// `stub` installs a sticky reply for a `(method, path)` pair;
/// `stub_once` queues one-shot replies consumed before the sticky one.
/// Unstubbed paths answer 404 with a null body. Every call is recorded
/// as `"METHOD path"` in `calls`.
pub struct MockApi {
    sticky: StdMutex<HashMap<String, Reply>>,
    once: StdMutex<HashMap<String, VecDeque<Reply>>>,
    calls: StdMutex<Vec<String>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sticky: StdMutex::new(HashMap::new()),
            once: StdMutex::new(HashMap::new()),
            calls: StdMutex::new(Vec::new()),
        })
    }

    pub fn stub(&self, method: Method, path: &str, status: u16, body: Value) {
        self.sticky
            .lock()
            .unwrap()
            .insert(key(method, path), Reply::Respond(status, body));
    }

    pub fn stub_once(&self, method: Method, path: &str, status: u16, body: Value) {
        self.once
            .lock()
            .unwrap()
            .entry(key(method, path))
            .or_default()
            .push_back(Reply::Respond(status, body));
    }

    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.sticky
            .lock()
            .unwrap()
            .insert(key(method, path), Reply::Fail(message.to_string()));
    }

    /// All recorded calls, as `"METHOD path"` strings.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls to one `(method, path)` pair.
    pub fn call_count(&self, method: Method, path: &str) -> usize {
        let wanted = key(method, path);
        self.calls.lock().unwrap().iter().filter(|c| **c == wanted).count()
    }
}

fn key(method: Method, path: &str) -> String {
    format!("{method} {path}")
}

#[async_trait]
impl LocalApi for MockApi {
    async fn request(
        &self,
        method: Method,
        path: &str,
        _body: Option<Value>,
    ) -> Result<LocalResponse, CompanionError> {
        let key = key(method, path);
        self.calls.lock().unwrap().push(key.clone());

        let reply = self
            .once
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
            .or_else(|| self.sticky.lock().unwrap().get(&key).cloned())
            .unwrap_or(Reply::Respond(404, Value::Null));

        match reply {
            Reply::Respond(status, body) => Ok(LocalResponse { status, body }),
            Reply::Fail(message) => Err(CompanionError::Transport(message)),
        }
    }
}

/// Install the standard handshake stubs: phase `"Lobby"`, summoner
/// `Ana#NA1`, region `euw`.
pub fn stub_handshake(api: &MockApi) {
    api.stub(Method::Get, GAMEFLOW_PHASE_PATH, 200, json!("Lobby"));
    api.stub(
        Method::Get,
        CURRENT_SUMMONER_PATH,
        200,
        json!({"gameName": "Ana", "tagLine": "NA1"}),
    );
    api.stub(Method::Get, REGION_LOCALE_PATH, 200, json!({"region": "euw"}));
}

// ── ChannelStream ───────────────────────────────────────────────────

/// Signals a test can feed into a live connection's event stream.
pub enum StreamSignal {
    Event(PushEvent),
    Error(String),
    Close,
}

/// Channel-backed event stream; the test side holds a [`StreamHandle`].
pub struct ChannelStream {
    rx: mpsc::UnboundedReceiver<StreamSignal>,
}

/// Test-side handle feeding a [`ChannelStream`].
#[derive(Clone)]
pub struct StreamHandle {
    tx: mpsc::UnboundedSender<StreamSignal>,
}

impl StreamHandle {
    pub fn push(&self, uri: &str, kind: EventKind, data: Value) {
        let _ = self.tx.send(StreamSignal::Event(PushEvent {
            uri: uri.to_string(),
            kind,
            data,
        }));
    }

    pub fn push_phase(&self, data: Value) {
        self.push(GAMEFLOW_PHASE_PATH, EventKind::Update, data);
    }

    pub fn push_summoner(&self, data: Value) {
        self.push(CURRENT_SUMMONER_PATH, EventKind::Update, data);
    }

    pub fn fail(&self, message: &str) {
        let _ = self.tx.send(StreamSignal::Error(message.to_string()));
    }

    pub fn close(&self) {
        let _ = self.tx.send(StreamSignal::Close);
    }
}

pub fn channel_stream() -> (ChannelStream, StreamHandle) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelStream { rx }, StreamHandle { tx })
}

#[async_trait]
impl EventStream for ChannelStream {
    async fn next_event(&mut self) -> Option<Result<PushEvent, CompanionError>> {
        match self.rx.recv().await {
            Some(StreamSignal::Event(event)) => Some(Ok(event)),
            Some(StreamSignal::Error(message)) => {
                Some(Err(CompanionError::Transport(message)))
            }
            Some(StreamSignal::Close) | None => None,
        }
    }

    async fn close(&mut self) -> Result<(), CompanionError> {
        self.rx.close();
        Ok(())
    }
}

// ── MockConnector ───────────────────────────────────────────────────

/// One scripted outcome of a connect attempt.
pub enum ConnectScript {
    Fail(String),
    Succeed(Arc<MockApi>, ChannelStream),
}

/// Scripted connector: each attempt consumes the next outcome; an
/// exhausted script fails further attempts. Attempts are counted.
pub struct MockConnector {
    script: StdMutex<VecDeque<ConnectScript>>,
    attempts: Arc<AtomicU32>,
}

impl MockConnector {
    pub fn new(script: Vec<ConnectScript>) -> (Self, Arc<AtomicU32>) {
        let attempts = Arc::new(AtomicU32::new(0));
        (
            Self {
                script: StdMutex::new(VecDeque::from(script)),
                attempts: Arc::clone(&attempts),
            },
            attempts,
        )
    }
}

#[async_trait]
impl LocalConnector for MockConnector {
    async fn connect(&self) -> Result<ConnectionHandle, CompanionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(ConnectScript::Succeed(api, stream)) => Ok(ConnectionHandle {
                api,
                events: Box::new(stream),
            }),
            Some(ConnectScript::Fail(message)) => Err(CompanionError::Connect(message)),
            None => Err(CompanionError::Connect("script exhausted".into())),
        }
    }
}

// ── Config helper ───────────────────────────────────────────────────

/// Fast-cycling config for tests: 3 attempts, 5 ms delay, no reconnect.
pub fn test_config() -> BridgeConfig {
    BridgeConfig::new()
        .with_connect_attempts(3)
        .with_connect_retry_delay(Duration::from_millis(5))
        .with_reconnect(false)
        .with_shutdown_timeout(Duration::from_millis(200))
}
