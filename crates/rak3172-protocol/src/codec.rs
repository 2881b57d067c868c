//! Line accumulation codec for the AT serial stream.
//!
//! The module's output is line-oriented: command responses and unsolicited
//! events both arrive as text terminated with `\n` (optionally preceded by
//! `\r`). The codec accumulates raw bytes from bounded reads and yields one
//! complete line at a time.

use bytes::{Buf, BytesMut};

use crate::error::{ProtocolError, ProtocolResult};

/// Maximum accepted line length. A line that grows past this without a
/// terminator is a protocol violation, not something to truncate.
pub const MAX_LINE_LENGTH: usize = 1024;

/// A codec for splitting the receive stream into lines.
#[derive(Debug, Default)]
pub struct LineCodec {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
}

impl LineCodec {
    /// Create a new line codec.
    pub fn new() -> Self {
        LineCodec { buffer: BytesMut::with_capacity(256) }
    }

    /// Add received data to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode one complete line from the buffer.
    ///
    /// Returns `Ok(Some(line))` with the terminator and any trailing `\r`
    /// stripped, `Ok(None)` if no complete line is buffered yet, or
    /// [`ProtocolError::BufferOverflow`] if the buffered data exceeds
    /// [`MAX_LINE_LENGTH`] without a terminator. Empty lines are skipped.
    pub fn decode_line(&mut self) -> ProtocolResult<Option<String>> {
        loop {
            let Some(end) = self.buffer.iter().position(|&b| b == b'\n') else {
                if self.buffer.len() > MAX_LINE_LENGTH {
                    return Err(ProtocolError::BufferOverflow {
                        max: MAX_LINE_LENGTH,
                        actual: self.buffer.len(),
                    });
                }
                return Ok(None);
            };

            let line_data = self.buffer.split_to(end);
            self.buffer.advance(1); // consume the '\n'

            let mut line = String::from_utf8_lossy(&line_data).to_string();
            if line.ends_with('\r') {
                line.pop();
            }

            if !line.is_empty() {
                return Ok(Some(line));
            }
        }
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_line() {
        let mut codec = LineCodec::new();
        codec.push(b"OK\r\n+EVT:JOINED\n");

        assert_eq!(codec.decode_line().unwrap(), Some("OK".to_string()));
        assert_eq!(codec.decode_line().unwrap(), Some("+EVT:JOINED".to_string()));
        assert_eq!(codec.decode_line().unwrap(), None);
    }

    #[test]
    fn test_partial_line() {
        let mut codec = LineCodec::new();
        codec.push(b"+EVT:RX_1:-38");
        assert_eq!(codec.decode_line().unwrap(), None);

        codec.push(b":13:UNICAST:1:48656c6c6f\n");
        assert_eq!(
            codec.decode_line().unwrap(),
            Some("+EVT:RX_1:-38:13:UNICAST:1:48656c6c6f".to_string())
        );
    }

    #[test]
    fn test_skips_blank_lines() {
        let mut codec = LineCodec::new();
        codec.push(b"\r\n\nOK\n");
        assert_eq!(codec.decode_line().unwrap(), Some("OK".to_string()));
    }

    #[test]
    fn test_overflow_without_terminator() {
        let mut codec = LineCodec::new();
        codec.push(&vec![b'a'; MAX_LINE_LENGTH + 1]);

        let err = codec.decode_line().unwrap_err();
        assert!(matches!(err, ProtocolError::BufferOverflow { .. }));
    }
}
