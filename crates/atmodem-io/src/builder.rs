//! ModemBuilder -- fluent builder for constructing [`ModemIo`] instances.
//!
//! Separates configuration from construction so that callers can set buffer
//! sizes, timeouts and hooks before handing over the byte stream.
//!
//! # Example
//!
//! ```
//! use atmodem_io::builder::ModemBuilder;
//! use atmodem_test_harness::{ManualClock, MockStream};
//! use std::time::Duration;
//!
//! # fn example() -> atmodem_core::Result<()> {
//! let modem = ModemBuilder::new()
//!     .line_buffer_size(256)
//!     .line_timeout(Duration::from_millis(100))
//!     .urc_handler(|line: &[u8]| line.starts_with(b"+UUSORD"))
//!     .build(MockStream::new(), ManualClock::new())?;
//! assert_eq!(modem.config().line_buffer_size, 256);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use std::time::Duration;

use atmodem_core::clock::Clock;
use atmodem_core::error::{Error, Result};
use atmodem_core::hooks::{PowerSwitch, UrcHandler, Watchdog};
use atmodem_core::stream::ByteStream;

use crate::io::{IoConfig, ModemIo};

/// Fluent builder for [`ModemIo`].
///
/// Defaults match [`IoConfig::default`]: a 1024-byte line buffer, a 250 ms
/// per-line timeout and busy-wait polling.
pub struct ModemBuilder {
    config: IoConfig,
    eager_buffer: bool,
    urc_handler: Option<Box<dyn UrcHandler>>,
    watchdog: Option<Box<dyn Watchdog>>,
    power: Option<Box<dyn PowerSwitch>>,
}

impl ModemBuilder {
    pub fn new() -> Self {
        ModemBuilder {
            config: IoConfig::default(),
            eager_buffer: false,
            urc_handler: None,
            watchdog: None,
            power: None,
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: IoConfig) -> Self {
        ModemBuilder {
            config,
            ..Self::new()
        }
    }

    /// Set the line buffer capacity, terminator included (default: 1024).
    pub fn line_buffer_size(mut self, size: usize) -> Self {
        self.config.line_buffer_size = size;
        self
    }

    /// Set the per-line timeout used while reading responses (default: 250ms).
    pub fn line_timeout(mut self, timeout: Duration) -> Self {
        self.config.line_timeout = timeout;
        self
    }

    /// Set the pause between empty polls (default: zero, busy-wait).
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Allocate the line buffer at build time instead of on first read.
    pub fn eager_buffer(mut self, eager: bool) -> Self {
        self.eager_buffer = eager;
        self
    }

    pub fn urc_handler(mut self, handler: impl UrcHandler + 'static) -> Self {
        self.urc_handler = Some(Box::new(handler));
        self
    }

    pub fn watchdog(mut self, watchdog: impl Watchdog + 'static) -> Self {
        self.watchdog = Some(Box::new(watchdog));
        self
    }

    pub fn power_switch(mut self, power: impl PowerSwitch + 'static) -> Self {
        self.power = Some(Box::new(power));
        self
    }

    /// Build a [`ModemIo`] over the given stream and clock.
    pub fn build<S: ByteStream, C: Clock>(self, stream: S, clock: C) -> Result<ModemIo<S, C>> {
        if self.config.line_buffer_size < 2 {
            return Err(Error::InvalidParameter(format!(
                "line_buffer_size must be at least 2, got {}",
                self.config.line_buffer_size
            )));
        }
        if self.config.line_timeout.is_zero() {
            return Err(Error::InvalidParameter(
                "line_timeout must be non-zero".into(),
            ));
        }

        let mut io = ModemIo::new(stream, clock, self.config);
        if let Some(handler) = self.urc_handler {
            io.set_urc_handler(handler);
        }
        if let Some(watchdog) = self.watchdog {
            io.set_watchdog(watchdog);
        }
        if let Some(power) = self.power {
            io.set_power_switch(power);
        }
        if self.eager_buffer {
            io.init_buffer();
        }
        Ok(io)
    }
}

impl Default for ModemBuilder {
    fn default() -> Self {
        Self::new()
    }
}
