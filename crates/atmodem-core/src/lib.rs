//! atmodem-core: Core traits, types, and error definitions for atmodem.
//!
//! This crate defines the capability interfaces the AT response reader
//! consumes. Board support code and transports implement them; the reader in
//! `atmodem-io` depends only on these traits.
//!
//! # Key types
//!
//! - [`ByteStream`] -- non-blocking byte-level access to the modem UART
//! - [`Clock`] / [`Deadline`] -- monotonic milliseconds and bounded waits
//! - [`UrcHandler`], [`Watchdog`], [`PowerSwitch`] -- injected hooks
//! - [`ResponseOutcome`] -- `Success`, `Error` or `Timeout`
//! - [`Error`] / [`Result`] -- error handling

pub mod clock;
pub mod error;
pub mod hooks;
pub mod stream;
pub mod types;

// Re-export key types at crate root for ergonomic `use atmodem_core::*`.
pub use clock::{Clock, Deadline, SystemClock, duration_to_millis};
pub use error::{Error, Result};
pub use hooks::{NoWatchdog, NullUrcHandler, PowerSwitch, UrcHandler, Watchdog};
pub use stream::ByteStream;
pub use types::ResponseOutcome;
