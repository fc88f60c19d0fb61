//! Configuration for the companion bridge.

use std::time::Duration;

/// Default number of connect attempts before giving up.
const DEFAULT_CONNECT_ATTEMPTS: u32 = 30;

/// Default fixed delay between connect attempts.
const DEFAULT_CONNECT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Default capacity of the bounded bridge event channel.
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default timeout for the graceful shutdown.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for a [`CompanionBridge`](crate::CompanionBridge).
///
/// All fields have defaults matching the shipped behavior: 30 connect
/// attempts spaced 10 seconds apart, reconnect after a drop, a bounded
/// event channel of 256, and a 1 second graceful-shutdown window.
///
/// # Example
///
/// ```
/// use league_companion::BridgeConfig;
/// use std::time::Duration;
///
/// let config = BridgeConfig::new()
///     .with_connect_attempts(5)
///     .with_connect_retry_delay(Duration::from_millis(100))
///     .with_reconnect(false);
/// assert_eq!(config.connect_attempts, 5);
/// ```
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Maximum number of connect attempts per connect cycle.
    ///
    /// Each attempt constructs a fresh connection handle. When the
    /// bound is exhausted the bridge reports
    /// [`ConnectionExhausted`](crate::BridgeEvent::ConnectionExhausted)
    /// once and stops scheduling further attempts.
    ///
    /// Defaults to **30**. Values below 1 are clamped to 1.
    pub connect_attempts: u32,
    /// Fixed delay between connect attempts.
    ///
    /// Defaults to **10 seconds**.
    pub connect_retry_delay: Duration,
    /// Whether a dropped connection starts a fresh connect cycle.
    ///
    /// When `false` the first disconnection is terminal for the
    /// session: the supervisor exits and later commands fail fast with
    /// [`NotConnected`](crate::CompanionError::NotConnected).
    ///
    /// Defaults to **true**.
    pub reconnect: bool,
    /// Capacity of the bounded bridge event channel.
    ///
    /// When the consumer cannot keep up, status events are dropped
    /// (with a warning logged) to avoid blocking the connection loop.
    /// `Disconnected` and `ConnectionExhausted` are always delivered
    /// regardless of capacity.
    ///
    /// Defaults to **256**. Values below 1 are clamped to 1.
    pub event_channel_capacity: usize,
    /// Timeout for the graceful shutdown.
    ///
    /// When [`CompanionBridge::shutdown`](crate::CompanionBridge::shutdown)
    /// is called the supervisor is given this much time to close the
    /// transport and emit a final `Disconnected` event before the task
    /// is aborted.
    ///
    /// Defaults to **1 second**.
    pub shutdown_timeout: Duration,
}

impl BridgeConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            connect_retry_delay: DEFAULT_CONNECT_RETRY_DELAY,
            reconnect: true,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Set the maximum number of connect attempts per connect cycle.
    ///
    /// Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_connect_attempts(mut self, attempts: u32) -> Self {
        self.connect_attempts = attempts.max(1);
        self
    }

    /// Set the fixed delay between connect attempts.
    #[must_use]
    pub fn with_connect_retry_delay(mut self, delay: Duration) -> Self {
        self.connect_retry_delay = delay;
        self
    }

    /// Enable or disable reconnection after a dropped connection.
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: bool) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Set the capacity of the bounded bridge event channel.
    ///
    /// Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }

    /// Set the timeout for the graceful shutdown.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}
