//! Monotonic millisecond clock and deadlines.
//!
//! Every wait in atmodem is a polling loop bounded by a [`Deadline`]. The
//! same primitive backs the single-byte read timeout and the overall
//! response timeout, so both expire by the same rule: a deadline started at
//! `t0` with limit `n` ms is expired once strictly more than `n` ms have
//! elapsed.
//!
//! Millisecond timestamps are `u32` and wrap after roughly 49.7 days, like
//! the tick counters found on microcontrollers. Elapsed time is computed with
//! wrapping subtraction, so a deadline spanning the wrap still works.

use std::time::{Duration, Instant};

/// A monotonic millisecond time source.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin. Wraps at `u32::MAX`.
    fn millis(&self) -> u32;

    /// Spend `interval` between two empty polls.
    ///
    /// The default returns immediately, which turns every wait into a tight
    /// busy-wait loop.
    fn pause(&self, interval: Duration) {
        let _ = interval;
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn millis(&self) -> u32 {
        (**self).millis()
    }

    fn pause(&self, interval: Duration) {
        (**self).pause(interval)
    }
}

/// Host clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn millis(&self) -> u32 {
        // Truncation is the wrap.
        self.origin.elapsed().as_millis() as u32
    }

    fn pause(&self, interval: Duration) {
        if !interval.is_zero() {
            std::thread::sleep(interval);
        }
    }
}

/// Convert a [`Duration`] to whole milliseconds, saturating at `u32::MAX`.
pub fn duration_to_millis(d: Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}

/// A start timestamp plus a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    start: u32,
    limit: u32,
}

impl Deadline {
    /// Start a deadline `timeout` from now.
    pub fn start<C: Clock + ?Sized>(clock: &C, timeout: Duration) -> Self {
        Self {
            start: clock.millis(),
            limit: duration_to_millis(timeout),
        }
    }

    /// Milliseconds elapsed since the deadline was started.
    pub fn elapsed_ms<C: Clock + ?Sized>(&self, clock: &C) -> u32 {
        clock.millis().wrapping_sub(self.start)
    }

    /// Time elapsed since the deadline was started.
    pub fn elapsed<C: Clock + ?Sized>(&self, clock: &C) -> Duration {
        Duration::from_millis(u64::from(self.elapsed_ms(clock)))
    }

    /// Whether strictly more than the limit has elapsed.
    pub fn is_expired<C: Clock + ?Sized>(&self, clock: &C) -> bool {
        self.elapsed_ms(clock) > self.limit
    }

    pub fn limit(&self) -> Duration {
        Duration::from_millis(u64::from(self.limit))
    }
}
