//! The `utils` module provides a collection of utility definitions used across
//! the `paranode` library.
//!
//! It centralizes the error type and the device clock abstraction so that the
//! rest of the crate shares a single notion of time and failure.

pub mod clock;
pub mod error;

pub use clock::{Clock, SystemClock};
pub use error::ParanodeError;
