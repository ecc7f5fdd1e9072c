//! The `clock` module defines the device clock used for timestamps, message
//! ages, and scheduling intervals.
//!
//! Time is a `u32` millisecond counter that wraps roughly every 49.7 days.
//! Everything that compares two readings must use wrapping arithmetic, which
//! `elapsed_ms` provides; a reading taken after a wrap still yields the correct
//! age for any span shorter than the full period.

use chrono::Utc;

/// Source of device time in milliseconds.
pub trait Clock {
    /// Current reading of the millisecond counter.
    fn now_ms(&self) -> u32;
}

/// Wall-clock backed implementation. Truncation to `u32` gives the counter its
/// wrap period.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u32 {
        Utc::now().timestamp_millis() as u32
    }
}

/// Age of `earlier` as seen from `now`, correct across counter wrap.
pub fn elapsed_ms(now: u32, earlier: u32) -> u32 {
    now.wrapping_sub(earlier)
}
