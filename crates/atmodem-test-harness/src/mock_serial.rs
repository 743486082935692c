//! Mock byte stream for deterministic testing of the response reader.
//!
//! [`MockStream`] implements [`ByteStream`] over a script of received bytes
//! and silent gaps. Bytes can be scripted up front, or released only after
//! the reader writes an expected command, mimicking a modem that answers
//! what it is asked.
//!
//! # Example
//!
//! ```
//! use atmodem_core::ByteStream;
//! use atmodem_test_harness::MockStream;
//!
//! let mut mock = MockStream::new();
//! mock.expect(b"AT+CSQ\r", b"AT+CSQ\r\n+CSQ: 15,99\r\n\r\nOK\r\n");
//!
//! assert_eq!(mock.read(), None);
//! mock.write_all(b"AT+CSQ\r").unwrap();
//! assert_eq!(mock.read(), Some(b'A'));
//! ```

use std::collections::VecDeque;

use atmodem_core::error::{Error, Result};
use atmodem_core::stream::ByteStream;

/// One step of the receive script.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    /// A byte the next poll returns.
    Byte(u8),
    /// The next `n` polls find nothing.
    Silence(usize),
}

/// A command the mock waits for before releasing its reply.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be written.
    request: Vec<u8>,
    /// Bytes appended to the receive script once `request` has been written.
    response: Vec<u8>,
}

/// A mock [`ByteStream`] for testing without a modem.
///
/// Received data is consumed in script order. Once the script is exhausted
/// every poll returns `None`, which the reader experiences as silence.
#[derive(Debug)]
pub struct MockStream {
    /// Pending receive script.
    script: VecDeque<Event>,
    /// Ordered queue of expected command/reply pairs.
    expectations: VecDeque<Expectation>,
    /// Bytes written since the last matched expectation.
    pending_write: Vec<u8>,
    /// Log of all bytes written through this stream.
    written: Vec<u8>,
    /// Number of `read()` calls, including empty ones.
    polls: usize,
    /// Whether the stream is "connected".
    connected: bool,
}

impl MockStream {
    /// Create a new, empty mock stream in the connected state.
    pub fn new() -> Self {
        MockStream {
            script: VecDeque::new(),
            expectations: VecDeque::new(),
            pending_write: Vec::new(),
            written: Vec::new(),
            polls: 0,
            connected: true,
        }
    }

    /// Create a mock stream that will deliver `bytes` right away.
    pub fn with_input(bytes: &[u8]) -> Self {
        let mut mock = Self::new();
        mock.push_bytes(bytes);
        mock
    }

    /// Append raw bytes to the receive script.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.script.extend(bytes.iter().copied().map(Event::Byte));
        self
    }

    /// Append a line followed by CR LF.
    pub fn push_line(&mut self, line: &str) -> &mut Self {
        self.push_bytes(line.as_bytes());
        self.push_bytes(b"\r\n")
    }

    /// Append a gap of `polls` empty reads.
    pub fn push_silence(&mut self, polls: usize) -> &mut Self {
        if polls > 0 {
            self.script.push_back(Event::Silence(polls));
        }
        self
    }

    /// Add an expected command/reply pair.
    ///
    /// When the bytes written (possibly across several `write` calls) equal
    /// `request`, `response` is appended to the receive script.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) -> &mut Self {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
        self
    }

    /// All bytes written through this stream.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Number of received bytes not yet consumed.
    pub fn remaining_bytes(&self) -> usize {
        self.script
            .iter()
            .filter(|e| matches!(e, Event::Byte(_)))
            .count()
    }

    /// Return the number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Total number of `read()` calls so far.
    pub fn polls(&self) -> usize {
        self.polls
    }

    /// Set the connected state of the mock stream.
    ///
    /// When set to `false`, reads return `None` and writes fail with
    /// [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    fn match_expectation(&mut self) -> Result<()> {
        let Some(next) = self.expectations.front() else {
            return Ok(());
        };

        if !next.request.starts_with(&self.pending_write) {
            return Err(Error::Transport(format!(
                "unexpected write: expected {:?}, got {:?}",
                String::from_utf8_lossy(&next.request),
                String::from_utf8_lossy(&self.pending_write),
            )));
        }

        if next.request.len() == self.pending_write.len() {
            if let Some(expectation) = self.expectations.pop_front() {
                self.pending_write.clear();
                self.push_bytes(&expectation.response);
            }
        }
        Ok(())
    }
}

impl Default for MockStream {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteStream for MockStream {
    fn read(&mut self) -> Option<u8> {
        self.polls += 1;
        if !self.connected {
            return None;
        }

        match self.script.pop_front()? {
            Event::Byte(b) => Some(b),
            Event::Silence(n) => {
                if n > 1 {
                    self.script.push_front(Event::Silence(n - 1));
                }
                None
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        self.written.extend_from_slice(data);
        if !self.expectations.is_empty() {
            self.pending_write.extend_from_slice(data);
            self.match_expectation()?;
        }
        Ok(data.len())
    }
}
