//! Accumulation of response payload into a caller-owned buffer.
//!
//! The output buffer is a plain `&mut [u8]` that stays NUL-terminated after
//! every operation, so firmware can hand it straight to C-style string code.
//! The last byte is always reserved for the terminator.
//!
//! Payload that does not fit is clipped without error. Callers size their
//! buffers for the responses they expect; [`ResponseAssembler::is_truncated`]
//! tells them afterwards whether anything was lost.

use tracing::debug;

/// Appends payload lines to an output buffer, newline separated.
#[derive(Debug)]
pub struct ResponseAssembler<'a> {
    buf: &'a mut [u8],
    len: usize,
    truncated: bool,
}

impl<'a> ResponseAssembler<'a> {
    /// Start assembling into `buf`, clearing it.
    ///
    /// An empty `buf` disables output: nothing will be classified as
    /// payload and nothing is ever written.
    pub fn new(buf: &'a mut [u8]) -> Self {
        if let Some(first) = buf.first_mut() {
            *first = 0;
        }
        ResponseAssembler {
            buf,
            len: 0,
            truncated: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Bytes of payload the buffer can hold.
    fn limit(&self) -> usize {
        self.buf.len().saturating_sub(1)
    }

    /// Append `line` minus its first `strip` bytes.
    ///
    /// Every line but the first is preceded by `\n`. Whatever does not fit
    /// before the reserved terminator byte is dropped.
    pub fn append(&mut self, line: &[u8], strip: usize) {
        let limit = self.limit();
        let payload = line.get(strip..).unwrap_or_default();

        if self.len > 0 && self.len < limit {
            self.buf[self.len] = b'\n';
            self.len += 1;
            self.buf[self.len] = 0;
        }

        let room = limit - self.len.min(limit);
        let n = payload.len().min(room);
        if n < payload.len() {
            self.truncated = true;
            debug!(
                dropped = payload.len() - n,
                capacity = self.buf.len(),
                "response payload truncated"
            );
        }
        if n == 0 {
            return;
        }

        self.buf[self.len..self.len + n].copy_from_slice(&payload[..n]);
        self.len += n;
        self.buf[self.len] = 0;
    }

    /// Bytes assembled so far, without the terminator.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether any payload byte was dropped for lack of room.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// The part of `buf` before its first NUL (all of it if there is none).
pub fn terminated(buf: &[u8]) -> &[u8] {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    &buf[..end]
}
