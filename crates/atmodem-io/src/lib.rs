//! Line framing, response classification and response assembly for AT
//! modems.
//!
//! This crate implements the read side of an AT command exchange over a
//! non-blocking [`ByteStream`](atmodem_core::ByteStream): bytes are polled
//! under a deadline, framed into CR LF lines, classified, and payload lines
//! are copied into a caller-owned buffer.
//!
//! # Architecture
//!
//! - [`framer`] -- bounded byte reads and line framing
//! - [`protocol`] -- result codes and the line classifier
//! - [`assembler`] -- NUL-terminated output accumulation with truncation
//! - [`io`] -- the [`ModemIo`] driver tying them together
//! - [`builder`] -- validated construction with hooks
//!
//! # Example
//!
//! ```
//! use atmodem_core::ResponseOutcome;
//! use atmodem_io::{ModemBuilder, terminated};
//! use atmodem_test_harness::{ManualClock, MockStream};
//! use std::time::Duration;
//!
//! let mut mock = MockStream::new();
//! mock.expect(b"AT+CSQ\r", b"+CSQ: 15,99\r\n\r\nOK\r\n");
//!
//! let mut modem = ModemBuilder::new()
//!     .build(mock, ManualClock::new())
//!     .unwrap();
//!
//! let mut out = [0u8; 32];
//! let outcome = modem
//!     .command("AT+CSQ", &mut out, Some("+CSQ: "), Duration::from_secs(1))
//!     .unwrap();
//! assert_eq!(outcome, ResponseOutcome::Success);
//! assert_eq!(terminated(&out), b"15,99");
//! ```

pub mod assembler;
pub mod builder;
pub mod framer;
pub mod io;
pub mod protocol;

pub use assembler::{ResponseAssembler, terminated};
pub use builder::ModemBuilder;
pub use framer::TimedSource;
pub use io::{IoConfig, ModemIo};
pub use protocol::LineClass;
