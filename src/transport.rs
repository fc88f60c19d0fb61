//! Transport abstraction for the local control endpoint.
//!
//! The local client exposes two surfaces that this crate consumes: a
//! request/response API (REST over the loopback interface) and an
//! asynchronous push-event stream. They are modeled as two traits so
//! that jobs scheduled into the connection context can issue follow-up
//! requests through a shared [`LocalApi`] handle while the event loop
//! exclusively owns the [`EventStream`].
//!
//! Connection setup is intentionally NOT part of these traits —
//! discovery and authentication differ per implementation. A
//! [`LocalConnector`] produces a fresh [`ConnectionHandle`] per
//! attempt; handles are never reused across attempts.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{CompanionError, Result};
use crate::event::PushEvent;

/// HTTP-style method for local endpoint requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Read a resource.
    Get,
    /// Invoke an operation.
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// A typed response from the local control endpoint.
///
/// Non-2xx statuses are not errors at this layer; callers such as the
/// lobby join sequencer inspect the status themselves.
#[derive(Debug, Clone)]
pub struct LocalResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body parsed as JSON; `Null` when the body was empty or
    /// not JSON.
    pub body: Value,
}

impl LocalResponse {
    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`CompanionError::Serialization`] if the body does not
    /// match `T`.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.body.clone()).map_err(CompanionError::from)
    }
}

/// Request side of a live local connection.
///
/// Implementations are `Send + Sync` and shared behind an `Arc`, so
/// both the event loop's handlers and dispatched jobs can issue calls.
/// A failed call surfaces as a single typed failure; this layer never
/// retries silently.
///
/// # Object Safety
///
/// This trait is object-safe; the connection handle stores it as
/// `Arc<dyn LocalApi>`.
#[async_trait]
pub trait LocalApi: Send + Sync {
    /// Perform one request against the local endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CompanionError::Transport`] if the request could not
    /// be completed (connection broken, transfer failed).
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<LocalResponse>;
}

/// Push-event side of a live local connection.
///
/// # Cancel Safety
///
/// [`next_event`](EventStream::next_event) **MUST** be cancel-safe
/// because it is polled inside `tokio::select!`. If the future is
/// dropped before completion, calling `next_event` again must not lose
/// events. Channel- or stream-backed implementations are naturally
/// cancel-safe.
#[async_trait]
pub trait EventStream: Send {
    /// Receive the next push event, in arrival order.
    ///
    /// Returns:
    /// - `Some(Ok(event))` — a decoded push event
    /// - `Some(Err(e))` — the stream failed ([`CompanionError::Transport`])
    /// - `None` — the local endpoint closed the stream cleanly
    async fn next_event(&mut self) -> Option<Result<PushEvent>>;

    /// Close the stream gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the close handshake fails; resources are
    /// released regardless.
    async fn close(&mut self) -> Result<()>;
}

/// One live connection to the local control endpoint.
///
/// Owns exactly one underlying transport. A handle is consumed by the
/// connection loop and dropped on disconnect; reconnecting always goes
/// through [`LocalConnector::connect`] for a fresh handle.
pub struct ConnectionHandle {
    /// Shared request side.
    pub api: Arc<dyn LocalApi>,
    /// Exclusively owned push-event side.
    pub events: Box<dyn EventStream>,
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle").finish_non_exhaustive()
    }
}

/// Factory for fresh connections to the local control endpoint.
///
/// Each call performs discovery and setup from scratch; no state is
/// carried over from a previous attempt.
#[async_trait]
pub trait LocalConnector: Send + Sync + 'static {
    /// Establish a new connection.
    ///
    /// # Errors
    ///
    /// Returns [`CompanionError::Connect`] when the local client is not
    /// running or the endpoint cannot be reached; the connection
    /// manager treats this as transient and retries.
    async fn connect(&self) -> Result<ConnectionHandle>;
}
