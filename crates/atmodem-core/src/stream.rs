//! Byte stream trait for modem communication.
//!
//! The [`ByteStream`] trait abstracts over the serial link to the modem.
//! Implementations exist for host serial ports (`atmodem-transport`) and for
//! scripted streams used in tests (`atmodem-test-harness`).
//!
//! The line reader never blocks inside the stream: `read` is a single
//! non-blocking poll, and every wait is bounded by a
//! [`Deadline`](crate::clock::Deadline) in the caller.

use crate::error::Result;

/// Non-blocking byte-level access to the modem UART.
pub trait ByteStream {
    /// Poll for a single received byte.
    ///
    /// Returns `None` immediately when nothing is pending. Transport errors
    /// are also reported as `None`; the caller treats them like silence and
    /// eventually times out.
    fn read(&mut self) -> Option<u8>;

    /// Write bytes to the modem, returning how many were accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Push any buffered output to the wire.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Write every byte of `data`, retrying short writes.
    fn write_all(&mut self, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            let n = self.write(data)?;
            if n == 0 {
                return Err(crate::error::Error::ConnectionLost);
            }
            data = &data[n..];
        }
        Ok(())
    }
}

impl<S: ByteStream + ?Sized> ByteStream for &mut S {
    fn read(&mut self) -> Option<u8> {
        (**self).read()
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        (**self).write(data)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<S: ByteStream + ?Sized> ByteStream for Box<S> {
    fn read(&mut self) -> Option<u8> {
        (**self).read()
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        (**self).write(data)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// Accepts at most `chunk` bytes per write call.
    struct Chunked {
        chunk: usize,
        written: Vec<u8>,
    }

    impl ByteStream for Chunked {
        fn read(&mut self) -> Option<u8> {
            None
        }

        fn write(&mut self, data: &[u8]) -> Result<usize> {
            let n = data.len().min(self.chunk);
            self.written.extend_from_slice(&data[..n]);
            Ok(n)
        }
    }

    #[test]
    fn write_all_retries_short_writes() {
        let mut s = Chunked {
            chunk: 3,
            written: Vec::new(),
        };
        s.write_all(b"AT+CSQ\r").unwrap();
        assert_eq!(s.written, b"AT+CSQ\r");
    }

    #[test]
    fn write_all_zero_progress_is_connection_lost() {
        let mut s = Chunked {
            chunk: 0,
            written: Vec::new(),
        };
        let result = s.write_all(b"AT\r");
        assert!(matches!(result, Err(Error::ConnectionLost)));
    }

    #[test]
    fn mut_ref_forwards() {
        let mut s = Chunked {
            chunk: 16,
            written: Vec::new(),
        };
        fn send<S: ByteStream>(mut stream: S) {
            stream.write_all(b"ATE0\r").unwrap();
            assert!(stream.read().is_none());
        }
        send(&mut s);
        assert_eq!(s.written, b"ATE0\r");
    }
}
