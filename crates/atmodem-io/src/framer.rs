//! Deadline-bounded reads and line framing.
//!
//! [`TimedSource`] borrows a [`ByteStream`] and a [`Clock`] for the duration
//! of one operation. Each read is a polling loop against its own
//! [`Deadline`]; between empty polls the clock's `pause` spends the
//! configured poll interval.

use std::time::Duration;

use atmodem_core::clock::{Clock, Deadline};
use atmodem_core::stream::ByteStream;
use tracing::trace;

use crate::protocol::{self, TERMINATOR};

/// A byte stream with bounded-wait reads.
pub struct TimedSource<'a, S: ?Sized, C: ?Sized> {
    stream: &'a mut S,
    clock: &'a C,
    poll_interval: Duration,
}

impl<'a, S, C> TimedSource<'a, S, C>
where
    S: ByteStream + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(stream: &'a mut S, clock: &'a C, poll_interval: Duration) -> Self {
        TimedSource {
            stream,
            clock,
            poll_interval,
        }
    }

    /// Read one byte, waiting at most `timeout` for it to arrive.
    pub fn read(&mut self, timeout: Duration) -> Option<u8> {
        let deadline = Deadline::start(self.clock, timeout);

        loop {
            if let Some(b) = self.stream.read() {
                return Some(b);
            }
            if deadline.is_expired(self.clock) {
                return None;
            }
            self.clock.pause(self.poll_interval);
        }
    }

    /// Fill `buf` until `terminator` is read, a byte read times out, or the
    /// buffer is full.
    ///
    /// The terminator is consumed but not stored. A NUL is written after the
    /// data when there is room for it. Returns the number of bytes stored.
    pub fn read_bytes_until(&mut self, terminator: u8, buf: &mut [u8], timeout: Duration) -> usize {
        let mut index = 0;

        while index < buf.len() {
            match self.read(timeout) {
                Some(c) if c != terminator => {
                    buf[index] = c;
                    index += 1;
                }
                _ => break,
            }
        }
        if index < buf.len() {
            buf[index] = 0;
        }

        index
    }

    /// Fill `buf` with raw bytes until a byte read times out or the buffer
    /// is full. Returns the number of bytes stored.
    pub fn read_bytes(&mut self, buf: &mut [u8], timeout: Duration) -> usize {
        let mut count = 0;

        while count < buf.len() {
            match self.read(timeout) {
                Some(c) => {
                    buf[count] = c;
                    count += 1;
                }
                None => break,
            }
        }

        count
    }

    /// Read one CR LF terminated line into `buf`.
    ///
    /// At most `buf.len() - 1` bytes are stored so the line can always be
    /// NUL-terminated. Framing stops at LF, at a full buffer, or when a
    /// single byte read times out; in the last case the partial line is
    /// returned. A trailing CR is removed. The returned length excludes the
    /// terminator and `buf[len]` is always 0.
    pub fn read_line(&mut self, buf: &mut [u8], timeout: Duration) -> usize {
        let Some(capacity) = buf.len().checked_sub(1) else {
            return 0;
        };

        let stop = TERMINATOR[TERMINATOR.len() - 1];
        let raw = self.read_bytes_until(stop, &mut buf[..capacity], timeout);
        let len = protocol::strip_terminator(&buf[..raw], TERMINATOR);
        buf[len] = 0;

        if raw > 0 {
            trace!(raw, len, "framed line");
        }
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atmodem_test_harness::{ManualClock, MockStream};

    const BYTE_TIMEOUT: Duration = Duration::from_millis(250);

    fn source<'a>(
        stream: &'a mut MockStream,
        clock: &'a ManualClock,
    ) -> TimedSource<'a, MockStream, ManualClock> {
        TimedSource::new(stream, clock, Duration::ZERO)
    }

    // -----------------------------------------------------------------------
    // read
    // -----------------------------------------------------------------------

    #[test]
    fn read_returns_pending_byte_immediately() {
        let mut mock = MockStream::with_input(b"O");
        let clock = ManualClock::new();
        assert_eq!(source(&mut mock, &clock).read(BYTE_TIMEOUT), Some(b'O'));
        assert_eq!(mock.polls(), 1);
    }

    #[test]
    fn read_times_out_after_limit() {
        let mut mock = MockStream::new();
        let clock = ManualClock::new();

        assert_eq!(source(&mut mock, &clock).read(Duration::from_millis(10)), None);
        // Strictly more than 10 ms had to pass.
        assert!(clock.now() > 10);
        assert!(clock.now() < 20);
    }

    #[test]
    fn read_survives_short_gap() {
        let mut mock = MockStream::new();
        mock.push_silence(50).push_bytes(b"K");
        let clock = ManualClock::new();

        assert_eq!(source(&mut mock, &clock).read(BYTE_TIMEOUT), Some(b'K'));
    }

    #[test]
    fn poll_interval_is_spent_between_empty_polls() {
        let mut mock = MockStream::new();
        let clock = ManualClock::with_tick(0);

        let got = TimedSource::new(&mut mock, &clock, Duration::from_millis(5))
            .read(Duration::from_millis(100));
        assert_eq!(got, None);
        // 5 ms per empty poll: 22 polls instead of hundreds.
        assert_eq!(mock.polls(), 22);
    }

    // -----------------------------------------------------------------------
    // read_bytes_until / read_bytes
    // -----------------------------------------------------------------------

    #[test]
    fn read_bytes_until_excludes_terminator_and_nul_terminates() {
        let mut mock = MockStream::with_input(b"@rest");
        let clock = ManualClock::new();
        let mut buf = [0xAAu8; 8];

        let n = source(&mut mock, &clock).read_bytes_until(b'@', &mut buf, BYTE_TIMEOUT);
        assert_eq!(n, 0);
        assert_eq!(buf[0], 0);
        assert_eq!(mock.remaining_bytes(), 4);
    }

    #[test]
    fn read_bytes_until_full_buffer_has_no_nul() {
        let mut mock = MockStream::with_input(b"ABCDEF");
        let clock = ManualClock::new();
        let mut buf = [0xAAu8; 4];

        let n = source(&mut mock, &clock).read_bytes_until(b'\n', &mut buf, BYTE_TIMEOUT);
        assert_eq!(n, 4);
        assert_eq!(&buf, b"ABCD");
    }

    #[test]
    fn read_bytes_stops_on_gap() {
        let mut mock = MockStream::with_input(&[0x01, 0x02, 0x03]);
        mock.push_silence(500).push_bytes(&[0x04]);
        let clock = ManualClock::new();
        let mut buf = [0u8; 16];

        let n = source(&mut mock, &clock).read_bytes(&mut buf, BYTE_TIMEOUT);
        assert_eq!(&buf[..n], &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn read_bytes_stops_when_full() {
        let mut mock = MockStream::with_input(b"0123456789");
        let clock = ManualClock::new();
        let mut buf = [0u8; 4];

        assert_eq!(source(&mut mock, &clock).read_bytes(&mut buf, BYTE_TIMEOUT), 4);
        assert_eq!(&buf, b"0123");
        assert_eq!(mock.remaining_bytes(), 6);
    }

    // -----------------------------------------------------------------------
    // read_line
    // -----------------------------------------------------------------------

    #[test]
    fn line_excludes_crlf_and_is_nul_terminated() {
        let mut mock = MockStream::new();
        mock.push_line("+CSQ: 15,99");
        let clock = ManualClock::new();
        let mut buf = [0xAAu8; 32];

        let n = source(&mut mock, &clock).read_line(&mut buf, BYTE_TIMEOUT);
        assert_eq!(n, 11);
        assert_eq!(&buf[..n], b"+CSQ: 15,99");
        assert_eq!(buf[n], 0);
        assert_eq!(mock.remaining_bytes(), 0);
    }

    #[test]
    fn bare_crlf_is_empty_line() {
        let mut mock = MockStream::with_input(b"\r\nOK\r\n");
        let clock = ManualClock::new();
        let mut buf = [0xAAu8; 16];

        let mut src = source(&mut mock, &clock);
        assert_eq!(src.read_line(&mut buf, BYTE_TIMEOUT), 0);
        assert_eq!(buf[0], 0);
        assert_eq!(src.read_line(&mut buf, BYTE_TIMEOUT), 2);
        assert_eq!(&buf[..3], b"OK\0");
    }

    #[test]
    fn lf_only_line_is_not_stripped() {
        let mut mock = MockStream::with_input(b"OK\n");
        let clock = ManualClock::new();
        let mut buf = [0u8; 16];

        assert_eq!(source(&mut mock, &clock).read_line(&mut buf, BYTE_TIMEOUT), 2);
    }

    #[test]
    fn gap_aborts_line_with_partial_content() {
        let mut mock = MockStream::with_input(b"+CSQ: 1");
        mock.push_silence(400).push_bytes(b"5,99\r\n");
        let clock = ManualClock::new();
        let mut buf = [0u8; 32];

        let mut src = source(&mut mock, &clock);
        let n = src.read_line(&mut buf, BYTE_TIMEOUT);
        assert_eq!(&buf[..n], b"+CSQ: 1");
        assert_eq!(buf[n], 0);

        let n = src.read_line(&mut buf, BYTE_TIMEOUT);
        assert_eq!(&buf[..n], b"5,99");
    }

    #[test]
    fn long_line_splits_at_capacity_minus_one() {
        let mut mock = MockStream::with_input(b"0123456789\r\n");
        let clock = ManualClock::new();
        let mut buf = [0xAAu8; 5];

        let mut src = source(&mut mock, &clock);
        let n = src.read_line(&mut buf, BYTE_TIMEOUT);
        assert_eq!(n, 4);
        assert_eq!(&buf, b"0123\0");

        let n = src.read_line(&mut buf, BYTE_TIMEOUT);
        assert_eq!(&buf[..n], b"4567");
        let n = src.read_line(&mut buf, BYTE_TIMEOUT);
        assert_eq!(&buf[..n], b"89");
    }

    #[test]
    fn one_byte_buffer_holds_only_the_nul() {
        let mut mock = MockStream::with_input(b"OK\r\n");
        let clock = ManualClock::new();
        let mut buf = [0xAAu8; 1];

        assert_eq!(source(&mut mock, &clock).read_line(&mut buf, BYTE_TIMEOUT), 0);
        assert_eq!(buf[0], 0);
    }

    #[test]
    fn empty_buffer_reads_nothing() {
        let mut mock = MockStream::with_input(b"OK\r\n");
        let clock = ManualClock::new();

        assert_eq!(source(&mut mock, &clock).read_line(&mut [], BYTE_TIMEOUT), 0);
        assert_eq!(mock.remaining_bytes(), 4);
    }

    #[test]
    fn silence_yields_empty_line_after_timeout() {
        let mut mock = MockStream::new();
        let clock = ManualClock::new();
        let mut buf = [0xAAu8; 8];

        assert_eq!(source(&mut mock, &clock).read_line(&mut buf, BYTE_TIMEOUT), 0);
        assert_eq!(buf[0], 0);
    }
}
