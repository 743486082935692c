//! Transport implementations for atmodem.
//!
//! This crate provides concrete implementations of the
//! [`ByteStream`](atmodem_core::ByteStream) trait from `atmodem-core`:
//!
//! - [`SerialStream`]: USB virtual COM ports and UART adapters on a host
//!
//! # Example
//!
//! ```no_run
//! use atmodem_core::ByteStream;
//! use atmodem_transport::SerialStream;
//!
//! # fn example() -> atmodem_core::Result<()> {
//! // A u-blox SARA module on a USB-UART bridge
//! let mut stream = SerialStream::open("/dev/ttyUSB0", 115_200)?;
//!
//! stream.write_all(b"AT\r")?;
//! let first = stream.read();
//! # Ok(())
//! # }
//! ```

pub mod serial;

pub use serial::{
    DataBits, FlowControl, Parity, SerialConfig, SerialStream, StopBits, list_ports,
};
