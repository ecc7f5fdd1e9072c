//! The `queue` module buffers outbound serialized messages while the device is
//! offline or batching.
//!
//! Storage is a fixed-capacity ring of payload slots allocated once at
//! construction; nothing is allocated afterwards. Under sustained pressure the
//! queue evicts by priority, so a burst of low-priority telemetry cannot crowd
//! out an error report.

pub mod message;
mod ring;

pub use message::Priority;
pub use ring::MessageQueue;
