//! Cross-context action dispatcher.
//!
//! User-triggered commands run on the UI's thread of control, which
//! must never call into the local connection directly and must never
//! block on the connection's event context. [`ActionDispatcher::invoke`]
//! bridges the two: it enqueues a closure onto the current connection's
//! FIFO job queue, the connection loop executes it inside its own
//! single-threaded context, and the result travels back on a oneshot
//! channel wrapped in a [`JobTicket`].
//!
//! When no live connection exists — before the first handshake, after a
//! drop, or after exhaustion — `invoke` resolves immediately with
//! [`NotConnected`](CompanionError::NotConnected) and the stale handle
//! is never touched. Jobs still queued when a connection drops are
//! discarded, which resolves their tickets the same way.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use tokio::sync::{mpsc, oneshot};

use crate::error::{CompanionError, Result};
use crate::session::SessionHandle;
use crate::transport::LocalApi;

/// Execution context handed to a dispatched job.
///
/// Cheap to clone into the job's future; `api` is the live connection's
/// request side and `session` reads the shared snapshot.
#[derive(Clone)]
pub struct JobContext {
    /// Request side of the live connection.
    pub api: Arc<dyn LocalApi>,
    /// Read handle over the session state.
    pub session: SessionHandle,
}

impl std::fmt::Debug for JobContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobContext").finish_non_exhaustive()
    }
}

/// A unit of work queued for the connection context.
pub(crate) type Job = Box<dyn FnOnce(JobContext) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// Shared slot holding the job sender of the current connection, or
/// `None` while disconnected. The connection manager installs a fresh
/// sender per connection and clears it on teardown.
type JobSlot = Arc<Mutex<Option<mpsc::UnboundedSender<Job>>>>;

/// Enqueues user commands into the connection's execution context.
///
/// Cloneable and callable from any thread; enqueueing never blocks.
#[derive(Clone)]
pub struct ActionDispatcher {
    slot: JobSlot,
}

impl ActionDispatcher {
    pub(crate) fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Install the job sender of a freshly established connection.
    pub(crate) fn install(&self, tx: mpsc::UnboundedSender<Job>) {
        *self.lock_slot() = Some(tx);
    }

    /// Clear the slot on disconnect so later invokes fail fast.
    pub(crate) fn clear(&self) {
        *self.lock_slot() = None;
    }

    /// Schedule `command` to run inside the connection's execution
    /// context, in FIFO order relative to other invokes.
    ///
    /// Returns a [`JobTicket`] that resolves once the command completed
    /// (or immediately with [`CompanionError::NotConnected`] when no
    /// live connection exists).
    #[must_use = "the ticket must be polled to observe the command result"]
    pub fn invoke<F, Fut, T>(&self, command: F) -> JobTicket<T>
    where
        F: FnOnce(JobContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel::<Result<T>>();

        match self.lock_slot().as_ref() {
            None => {
                let _ = result_tx.send(Err(CompanionError::NotConnected));
            }
            Some(job_tx) => {
                let job: Job = Box::new(move |ctx| {
                    Box::pin(async move {
                        let _ = result_tx.send(command(ctx).await);
                    })
                });
                // A send failure means the connection loop already
                // exited; dropping the job drops the result sender and
                // the ticket resolves to NotConnected.
                let _ = job_tx.send(job);
            }
        }

        JobTicket { rx: result_rx }
    }

    /// True while a live connection can accept jobs.
    pub fn is_connected(&self) -> bool {
        self.lock_slot().is_some()
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Option<mpsc::UnboundedSender<Job>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Pending result of a dispatched command.
///
/// Await it from an async context, or poll it with
/// [`try_result`](JobTicket::try_result) from a synchronous one (the
/// tray UI polls on its own timer). A ticket whose job was discarded by
/// a connection drop resolves to
/// [`NotConnected`](CompanionError::NotConnected).
#[derive(Debug)]
pub struct JobTicket<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> JobTicket<T> {
    /// Non-blocking poll for the result.
    ///
    /// Returns `None` while the command is still pending.
    pub fn try_result(&mut self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(CompanionError::NotConnected)),
        }
    }
}

impl<T> Future for JobTicket<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_closed)) => Poll::Ready(Err(CompanionError::NotConnected)),
            Poll::Pending => Poll::Pending,
        }
    }
}
