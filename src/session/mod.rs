//! The `session` module layers an authenticated identity on top of the raw
//! transport channel.
//!
//! A session is only "ready" when the transport is connected AND the server has
//! accepted the device's identity. Every user-data send is gated on both, so no
//! telemetry can leave the device before authentication completes.

mod connection;

pub use connection::{Credentials, DeviceIdentity, Session};

#[cfg(test)]
mod tests;
