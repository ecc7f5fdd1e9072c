//! The `client` module contains the `Paranode` orchestrator, the single
//! coordinating state machine over the link, the transport session, and the
//! message queue.
//!
//! All work happens inside the non-blocking `tick` call that the embedding
//! application drives from its main loop; there is no background thread on
//! this side of the transport boundary.

mod paranode;
mod telemetry;

pub use paranode::{Paranode, ResourceMetrics};
pub use telemetry::TelemetryValue;
