//! The `error` module defines the error type used within the `paranode` library.
//!
//! Only construction and configuration can fail with an error value. Runtime
//! send and enqueue outcomes are reported as booleans or counts: every runtime
//! failure degrades to "drop and continue" or "try again later", never a panic.

use thiserror::Error;

/// Errors surfaced while building or configuring a client.
#[derive(Debug, Error)]
pub enum ParanodeError {
    /// Loading or merging configuration failed.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The transport runtime could not be created.
    #[error("transport error: {0}")]
    Transport(String),
}
