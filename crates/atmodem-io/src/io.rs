//! Command/response driver for AT modems.
//!
//! [`ModemIo`] owns the byte stream, the clock, the reusable line buffer and
//! the injected hooks. Everything runs on the caller's thread: a response
//! read is a loop of line reads, each a loop of bounded byte polls, and the
//! whole thing ends at `OK`, at an error result code, or at the caller's
//! deadline.
//!
//! There is no idle processing: URCs are only seen while a response is
//! being read, and are handed to the [`UrcHandler`] as they arrive.

use std::time::Duration;

use tracing::debug;

use atmodem_core::clock::{Clock, Deadline, SystemClock};
use atmodem_core::error::Result;
use atmodem_core::hooks::{NoWatchdog, NullUrcHandler, PowerSwitch, UrcHandler, Watchdog};
use atmodem_core::stream::ByteStream;
use atmodem_core::types::ResponseOutcome;

use crate::assembler::ResponseAssembler;
use crate::framer::TimedSource;
use crate::protocol::{self, COMMAND_TERMINATOR, LineClass};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Default line buffer size in bytes.
pub const DEFAULT_LINE_BUFFER_SIZE: usize = 1024;

/// Default per-line timeout while reading a response.
pub const DEFAULT_LINE_TIMEOUT: Duration = Duration::from_millis(250);

/// Configuration for the modem IO driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoConfig {
    /// Capacity of the line buffer, including the NUL terminator.
    pub line_buffer_size: usize,
    /// Longest gap between two bytes of one line while reading a response.
    /// Must be shorter than any response timeout to be meaningful.
    pub line_timeout: Duration,
    /// Time spent between two empty polls of the stream. Zero busy-waits.
    pub poll_interval: Duration,
}

impl Default for IoConfig {
    fn default() -> Self {
        IoConfig {
            line_buffer_size: DEFAULT_LINE_BUFFER_SIZE,
            line_timeout: DEFAULT_LINE_TIMEOUT,
            poll_interval: Duration::ZERO,
        }
    }
}

/// AT command driver over a [`ByteStream`].
///
/// Construct with [`ModemIo::new`] or, to validate the configuration and
/// install hooks in one go, with [`ModemBuilder`](crate::builder::ModemBuilder).
pub struct ModemIo<S, C = SystemClock> {
    stream: S,
    clock: C,
    config: IoConfig,
    /// Reused for every line; allocated once by [`ModemIo::init_buffer`].
    line: Option<Box<[u8]>>,
    line_len: usize,
    urc_handler: Box<dyn UrcHandler>,
    watchdog: Box<dyn Watchdog>,
    power: Option<Box<dyn PowerSwitch>>,
}

impl<S: ByteStream, C: Clock> ModemIo<S, C> {
    /// Create a driver with no URC handler, no watchdog and no power switch.
    ///
    /// The line buffer is not allocated until the first read (or an explicit
    /// [`init_buffer`](Self::init_buffer)).
    pub fn new(stream: S, clock: C, config: IoConfig) -> Self {
        ModemIo {
            stream,
            clock,
            config,
            line: None,
            line_len: 0,
            urc_handler: Box::new(NullUrcHandler),
            watchdog: Box::new(NoWatchdog),
            power: None,
        }
    }

    pub fn set_urc_handler(&mut self, handler: Box<dyn UrcHandler>) {
        self.urc_handler = handler;
    }

    pub fn set_watchdog(&mut self, watchdog: Box<dyn Watchdog>) {
        self.watchdog = watchdog;
    }

    pub fn set_power_switch(&mut self, power: Box<dyn PowerSwitch>) {
        self.power = Some(power);
    }

    /// Allocate the line buffer. Safe to call any number of times; only the
    /// first call allocates.
    pub fn init_buffer(&mut self) {
        if self.line.is_none() {
            debug!(size = self.config.line_buffer_size, "allocating line buffer");
            self.line = Some(vec![0u8; self.config.line_buffer_size].into_boxed_slice());
        }
    }

    pub fn is_buffer_initialized(&self) -> bool {
        self.line.is_some()
    }

    /// Whether the modem is powered. Without a power switch the modem is
    /// assumed to be on.
    pub fn is_on(&self) -> bool {
        self.power.as_ref().is_none_or(|p| p.is_on())
    }

    pub fn config(&self) -> &IoConfig {
        &self.config
    }

    pub fn stream(&self) -> &S {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Tear down the driver and hand back the stream and clock.
    pub fn into_parts(self) -> (S, C) {
        (self.stream, self.clock)
    }

    // -----------------------------------------------------------------------
    // Reading
    // -----------------------------------------------------------------------

    /// Read one byte, waiting at most `timeout`.
    pub fn timed_read(&mut self, timeout: Duration) -> Option<u8> {
        TimedSource::new(&mut self.stream, &self.clock, self.config.poll_interval).read(timeout)
    }

    /// Read raw bytes into `buf` until a byte read times out or `buf` is
    /// full.
    pub fn read_bytes(&mut self, buf: &mut [u8], timeout: Duration) -> usize {
        TimedSource::new(&mut self.stream, &self.clock, self.config.poll_interval)
            .read_bytes(buf, timeout)
    }

    /// Read into `buf` up to (not including) `terminator`.
    pub fn read_bytes_until(&mut self, terminator: u8, buf: &mut [u8], timeout: Duration) -> usize {
        TimedSource::new(&mut self.stream, &self.clock, self.config.poll_interval)
            .read_bytes_until(terminator, buf, timeout)
    }

    /// Read one line into a caller-supplied buffer.
    pub fn read_line_into(&mut self, buf: &mut [u8], timeout: Duration) -> usize {
        TimedSource::new(&mut self.stream, &self.clock, self.config.poll_interval)
            .read_line(buf, timeout)
    }

    /// Read one line into the driver's line buffer; see [`line`](Self::line).
    pub fn read_line(&mut self, timeout: Duration) -> usize {
        self.init_buffer();
        let Some(buf) = self.line.as_deref_mut() else {
            return 0;
        };

        self.line_len = TimedSource::new(&mut self.stream, &self.clock, self.config.poll_interval)
            .read_line(buf, timeout);
        self.line_len
    }

    /// The most recently framed line, without terminator.
    pub fn line(&self) -> &[u8] {
        self.line
            .as_deref()
            .map(|buf| &buf[..self.line_len])
            .unwrap_or_default()
    }

    /// Consume input until `prompt` arrives or `timeout` passes.
    ///
    /// Used before sending binary payloads (`@` for socket writes, `>` for
    /// SMS text). Bytes seen while waiting are traced line by line. The
    /// line buffer holds the text received after the last line break.
    pub fn wait_for_prompt(&mut self, prompt: u8, timeout: Duration) -> bool {
        self.init_buffer();
        let Some(buf) = self.line.as_deref_mut() else {
            return false;
        };
        let capacity = buf.len().saturating_sub(1);

        let deadline = Deadline::start(&self.clock, timeout);
        let mut len = 0;
        let mut found = false;

        loop {
            match self.stream.read() {
                Some(b'\r' | b'\n') => {
                    if len > 0 {
                        debug!(line = %String::from_utf8_lossy(&buf[..len]), "<<");
                        len = 0;
                    }
                }
                Some(c) => {
                    if len < capacity {
                        buf[len] = c;
                        len += 1;
                    }
                    if c == prompt {
                        found = true;
                        break;
                    }
                }
                None => self.clock.pause(self.config.poll_interval),
            }
            if deadline.is_expired(&self.clock) {
                break;
            }
        }

        if len > 0 {
            debug!(line = %String::from_utf8_lossy(&buf[..len]), "<<");
        }
        if let Some(end) = buf.get_mut(len) {
            *end = 0;
        }
        self.line_len = len;

        if !found {
            debug!(prompt = %char::from(prompt), "prompt wait timed out");
        }
        found
    }

    /// Read the response to a command.
    ///
    /// Lines are classified by [`protocol::classify`]. Payload lines (those
    /// starting with `prefix`, or every unclaimed line when `prefix` is
    /// `None`) are assembled into `out`; pass an empty `out` to discard
    /// payload. `out` is cleared first and is NUL-terminated on return,
    /// whatever the outcome.
    ///
    /// Returns [`ResponseOutcome::Timeout`] when neither `OK` nor an error
    /// code arrived within `timeout`; `out` then holds whatever payload was
    /// assembled.
    pub fn read_response(
        &mut self,
        out: &mut [u8],
        prefix: Option<&str>,
        timeout: Duration,
    ) -> ResponseOutcome {
        let prefix = prefix.map(str::as_bytes).filter(|p| !p.is_empty());
        let mut assembler = ResponseAssembler::new(out);
        let deadline = Deadline::start(&self.clock, timeout);

        while !deadline.is_expired(&self.clock) {
            let count = self.read_line(self.config.line_timeout);
            if count == 0 {
                continue;
            }

            self.watchdog.reset();

            let Some(buf) = self.line.as_deref() else {
                continue;
            };
            let line = &buf[..count];
            debug!(line = %String::from_utf8_lossy(line), "<<");

            match protocol::classify(line, prefix, assembler.is_enabled(), &mut *self.urc_handler) {
                LineClass::Echo | LineClass::Urc => {}
                LineClass::Success => return ResponseOutcome::Success,
                LineClass::Error => return ResponseOutcome::Error,
                LineClass::Payload { strip } => assembler.append(line, strip),
                LineClass::Unhandled => {
                    debug!(line = %String::from_utf8_lossy(line), "dropping unexpected line");
                }
            }
        }

        debug!(
            timeout_ms = deadline.limit().as_millis(),
            assembled = assembler.len(),
            "response read timed out"
        );
        ResponseOutcome::Timeout
    }

    // -----------------------------------------------------------------------
    // Writing
    // -----------------------------------------------------------------------

    /// Write a single raw byte.
    pub fn write_byte(&mut self, value: u8) -> Result<usize> {
        self.stream.write(&[value])
    }

    /// Write raw bytes (binary socket payloads and the like).
    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write_all(data)
    }

    /// Send `cmd` followed by the command terminator.
    pub fn send_command(&mut self, cmd: &str) -> Result<()> {
        debug!(command = cmd, ">>");
        self.stream.write_all(cmd.as_bytes())?;
        self.stream.write_all(&[COMMAND_TERMINATOR])?;
        self.stream.flush()
    }

    /// Send `cmd` and read its response into `out`.
    pub fn command(
        &mut self,
        cmd: &str,
        out: &mut [u8],
        prefix: Option<&str>,
        timeout: Duration,
    ) -> Result<ResponseOutcome> {
        self.send_command(cmd)?;
        Ok(self.read_response(out, prefix, timeout))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
