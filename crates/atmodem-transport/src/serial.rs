//! Serial port byte stream for modem communication.
//!
//! This module provides [`SerialStream`], which implements the
//! [`ByteStream`] trait over a host serial port. Cellular modules usually
//! show up as a USB virtual COM port or sit behind a USB-UART bridge:
//! - u-blox SARA-R4/N2: 115200 baud (autobauding on the R4)
//! - SIMCom SIM7000: 115200 baud
//! - Quectel BG96: 115200 baud
//!
//! The port is opened with a zero read timeout so that each
//! [`read`](ByteStream::read) is a single non-blocking poll; the response
//! reader supplies the deadlines.
//!
//! # Example
//!
//! ```no_run
//! use atmodem_transport::{SerialConfig, SerialStream, FlowControl};
//!
//! # fn example() -> atmodem_core::Result<()> {
//! let config = SerialConfig {
//!     baud_rate: 115_200,
//!     flow_control: FlowControl::Hardware,
//!     ..Default::default()
//! };
//! let stream = SerialStream::open_with_config("/dev/ttyACM0", config)?;
//! # Ok(())
//! # }
//! ```

use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use atmodem_core::error::{Error, Result};
use atmodem_core::stream::ByteStream;

/// Line settings for a modem UART.
///
/// The default, 9600 8N1 without flow control, is what most modules accept
/// out of reset before autobauding or `AT+IPR` changes it.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Bits per second.
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    /// RTS/CTS on modules that wire it up.
    pub flow_control: FlowControl,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
        }
    }
}

/// Character width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl From<DataBits> for serialport::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => serialport::DataBits::Five,
            DataBits::Six => serialport::DataBits::Six,
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

impl From<StopBits> for serialport::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    None,
    Software,
    Hardware,
}

impl From<FlowControl> for serialport::FlowControl {
    fn from(flow: FlowControl) -> Self {
        match flow {
            FlowControl::None => serialport::FlowControl::None,
            FlowControl::Software => serialport::FlowControl::Software,
            FlowControl::Hardware => serialport::FlowControl::Hardware,
        }
    }
}

/// Names of the serial ports present on this host.
pub fn list_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports()
        .map_err(|e| Error::Transport(format!("failed to enumerate serial ports: {e}")))?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

/// Map a write-side I/O error, distinguishing a vanished device.
fn map_io_error(e: std::io::Error) -> Error {
    match e.kind() {
        ErrorKind::BrokenPipe | ErrorKind::NotConnected => Error::ConnectionLost,
        _ => Error::Io(e),
    }
}

/// Serial port byte stream.
///
/// Implements the [`ByteStream`] trait for USB virtual COM ports and UART
/// adapters connected to a modem.
pub struct SerialStream {
    /// `None` once closed.
    port: Option<Box<dyn serialport::SerialPort>>,
    /// Path the port was opened with, for log fields.
    port_name: String,
}

impl SerialStream {
    /// Open a serial port with the given baud rate and default settings
    /// (8N1, no flow control).
    ///
    /// # Arguments
    ///
    /// * `port` - device path, `/dev/ttyACM0` on Linux or `COM7` on Windows
    /// * `baud_rate` - the modem's configured rate
    pub fn open(port: &str, baud_rate: u32) -> Result<Self> {
        let config = SerialConfig {
            baud_rate,
            ..Default::default()
        };
        Self::open_with_config(port, config)
    }

    /// Open `port` with explicit line settings.
    pub fn open_with_config(port: &str, config: SerialConfig) -> Result<Self> {
        tracing::debug!(port = %port, config = ?config, "opening modem port");

        let serial = serialport::new(port, config.baud_rate)
            .data_bits(config.data_bits.into())
            .stop_bits(config.stop_bits.into())
            .parity(config.parity.into())
            .flow_control(config.flow_control.into())
            .timeout(Duration::ZERO)
            .open()
            .map_err(|e| {
                tracing::error!(port = %port, error = %e, "cannot open modem port");
                Error::Transport(format!("Failed to open serial port {port}: {e}"))
            })?;

        tracing::info!(port = %port, baud = config.baud_rate, "modem port open");

        Ok(Self {
            port: Some(serial),
            port_name: port.to_string(),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    /// Flush and release the port. Later reads return `None` and writes
    /// fail with [`Error::NotConnected`].
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut port) = self.port.take() {
            tracing::debug!(port = %self.port_name, "closing modem port");

            if let Err(e) = Write::flush(&mut port) {
                tracing::warn!(
                    port = %self.port_name,
                    error = %e,
                    "flush on close failed"
                );
            }

            tracing::info!(port = %self.port_name, "modem port closed");
        }

        Ok(())
    }
}

impl ByteStream for SerialStream {
    fn read(&mut self) -> Option<u8> {
        let port = self.port.as_mut()?;
        let mut byte = [0u8; 1];

        match Read::read(port, &mut byte) {
            Ok(1) => {
                tracing::trace!(port = %self.port_name, byte = byte[0], "Received byte");
                Some(byte[0])
            }
            Ok(_) => None,
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => None,
            Err(e) => {
                tracing::warn!(
                    port = %self.port_name,
                    error = %e,
                    "modem port read failed"
                );
                None
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        tracing::trace!(
            port = %self.port_name,
            bytes = data.len(),
            data = ?data,
            "Sending data"
        );

        Write::write(port, data).map_err(|e| {
            tracing::error!(
                port = %self.port_name,
                error = %e,
                "modem port write failed"
            );
            map_io_error(e)
        })
    }

    fn flush(&mut self) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;
        Write::flush(port).map_err(map_io_error)
    }
}

impl Drop for SerialStream {
    fn drop(&mut self) {
        if self.port.is_some() {
            tracing::debug!(port = %self.port_name, "modem port dropped");
        }
    }
}
