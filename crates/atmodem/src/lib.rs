//! # atmodem -- AT Command Response Reader
//!
//! `atmodem` reads and classifies the responses of AT-command modems
//! (u-blox, SIMCom, Quectel and similar cellular/IoT modules). It frames the
//! incoming byte stream into CR LF lines, recognizes the `OK` and error
//! result codes, routes unsolicited result codes to a handler, and copies
//! the payload lines into a caller-owned, NUL-terminated buffer.
//!
//! Everything runs on the caller's thread: reads poll a non-blocking
//! [`ByteStream`] under a [`Clock`]-driven deadline, so the same code works on
//! a host serial port and in firmware with a UART ring buffer.
//!
//! ## Quick Start
//!
//! Add `atmodem` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! atmodem = "0.1"
//! ```
//!
//! Query the signal quality:
//!
//! ```no_run
//! use std::time::Duration;
//! use atmodem::{ModemBuilder, ResponseOutcome, SystemClock, terminated};
//! use atmodem::serial::SerialStream;
//!
//! fn main() -> atmodem::Result<()> {
//!     let stream = SerialStream::open("/dev/ttyUSB0", 115_200)?;
//!     let mut modem = ModemBuilder::new().build(stream, SystemClock::new())?;
//!
//!     let mut out = [0u8; 64];
//!     let outcome = modem.command("AT+CSQ", &mut out, Some("+CSQ: "), Duration::from_secs(1))?;
//!     if outcome == ResponseOutcome::Success {
//!         println!("CSQ: {}", String::from_utf8_lossy(terminated(&out)));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! | Crate                  | Purpose                                          |
//! |------------------------|--------------------------------------------------|
//! | `atmodem-core`         | Traits ([`ByteStream`], [`Clock`], hooks), errors |
//! | `atmodem-io`           | Framing, classification, assembly, [`ModemIo`]   |
//! | `atmodem-transport`    | Host serial port stream                          |
//! | `atmodem-test-harness` | Scripted stream and manual clock for tests       |
//! | **`atmodem`**          | This facade crate -- re-exports everything       |
//!
//! ## Feature Flags
//!
//! | Feature  | Enables                                  | Default |
//! |----------|------------------------------------------|---------|
//! | `serial` | [`serial`] module (host serial port)     | yes     |
//!
//! ## Unsolicited result codes
//!
//! Lines that are neither result codes nor payload are offered to the
//! installed [`UrcHandler`]. Any `FnMut(&[u8]) -> bool` closure works:
//!
//! ```
//! use atmodem::ModemBuilder;
//! use atmodem_test_harness::{ManualClock, MockStream};
//!
//! let modem = ModemBuilder::new()
//!     .urc_handler(|line: &[u8]| {
//!         if line.starts_with(b"+CREG: ") {
//!             // registration state changed
//!             return true;
//!         }
//!         false
//!     })
//!     .build(MockStream::new(), ManualClock::new())
//!     .unwrap();
//! # drop(modem);
//! ```

pub use atmodem_core::*;
pub use atmodem_io::{
    IoConfig, LineClass, ModemBuilder, ModemIo, ResponseAssembler, TimedSource, terminated,
};

/// Line framing, classification and assembly internals.
///
/// Exposes [`protocol`](io::protocol) constants and the classifier for code
/// that drives its own read loop.
pub mod io {
    pub use atmodem_io::*;
}

/// Host serial port transport.
///
/// Provides [`SerialStream`](serial::SerialStream), a [`ByteStream`] over a
/// USB virtual COM port or UART adapter, plus [`list_ports`](serial::list_ports).
#[cfg(feature = "serial")]
pub mod serial {
    pub use atmodem_transport::*;
}
