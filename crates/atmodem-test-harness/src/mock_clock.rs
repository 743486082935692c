//! Manually driven millisecond clock.
//!
//! [`ManualClock`] advances by a fixed tick every time it is read, so a
//! polling loop that finds no data still makes progress toward its deadline.
//! With the default tick of 1 ms, a 250 ms byte timeout expires after about
//! 251 empty polls, independent of how fast the test machine is.
//!
//! Clones share the same time, so a test can keep a handle and inspect or
//! advance the clock while the reader owns another.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use atmodem_core::clock::{Clock, duration_to_millis};

#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<AtomicU32>,
    tick: u32,
}

impl ManualClock {
    /// Clock at 0 ms that advances 1 ms per read.
    pub fn new() -> Self {
        Self::with_tick(1)
    }

    /// Clock at 0 ms that advances `tick` ms per read.
    pub fn with_tick(tick: u32) -> Self {
        ManualClock {
            now: Arc::new(AtomicU32::new(0)),
            tick,
        }
    }

    /// Move the clock to `ms` (useful for exercising the counter wrap).
    pub fn starting_at(self, ms: u32) -> Self {
        self.now.store(ms, Ordering::SeqCst);
        self
    }

    /// Current time without ticking.
    pub fn now(&self) -> u32 {
        self.now.load(Ordering::SeqCst)
    }

    pub fn advance(&self, ms: u32) {
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.wrapping_add(ms))
            });
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn millis(&self) -> u32 {
        let before = self.now();
        self.advance(self.tick);
        before
    }

    fn pause(&self, interval: Duration) {
        self.advance(duration_to_millis(interval));
    }
}
