//! The `json` module provides a zero-allocation JSON serializer for outbound
//! frames.
//!
//! Wire frames on the hot path (telemetry, heartbeats, metrics) are small flat
//! objects built thousands of times over a device's life. `JsonBuilder` writes
//! them in one pass into a caller-owned fixed buffer, so frame construction
//! never touches the allocator.

mod builder;

pub use builder::JsonBuilder;
