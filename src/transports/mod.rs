//! Transport implementations for the local control endpoint.
//!
//! This module provides concrete implementations of the local transport
//! traits behind feature gates. Enable the corresponding Cargo feature
//! to pull in a transport:
//!
//! | Feature         | Connector                 |
//! |-----------------|---------------------------|
//! | `transport-lcu` | [`LcuConnector`]          |
//!
//! # Example
//!
//! ```rust,ignore
//! use league_companion::{BridgeConfig, CompanionBridge, LcuConnector};
//!
//! let connector = LcuConnector::from_default_paths();
//! let (bridge, events) = CompanionBridge::start(connector, BridgeConfig::new());
//! ```

#[cfg(feature = "transport-lcu")]
pub mod lcu;

#[cfg(feature = "transport-lcu")]
pub use lcu::LcuConnector;
