//! # Paranode
//!
//! `paranode` is a device-side client SDK for the Paranode IoT platform. It
//! authenticates a device to the cloud service over a WebSocket, sends
//! telemetry, and receives remote commands and configuration, with a
//! fixed-capacity message queue to ride out connectivity gaps.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `client`: The `Paranode` orchestrator, the single tick-driven state machine
//!   that coordinates the link, the session, and the queue.
//! - `config`: Handles loading and merging client configuration.
//! - `json`: A zero-allocation JSON builder writing into a caller-owned buffer.
//! - `queue`: A fixed-capacity circular message queue with priority-aware
//!   eviction, expiry, and batching.
//! - `session`: The authenticated session layer; gates all user data on a
//!   successful identity handshake.
//! - `transport`: The duplex text channel abstraction, its WebSocket
//!   implementation, and the wire frame definitions.
//! - `utils`: Shared utilities, such as error handling and the device clock.

pub mod client;
pub mod config;
pub mod json;
pub mod queue;
pub mod session;
pub mod transport;
pub mod utils;

pub use client::{Paranode, TelemetryValue};
pub use queue::Priority;
pub use session::Credentials;
