//! Unsolicited event parsing.
//!
//! The module emits `+EVT:` lines on its own schedule: join results,
//! transmit completion, link check reports and received downlink frames.
//! Events can interleave with command responses on the same line-based
//! channel, so classification works on one line at a time.

use log::trace;

use crate::error::{ProtocolError, ProtocolResult};
use crate::hex;

/// Maximum decoded payload size of a received frame, in bytes.
pub const MAX_FRAME_PAYLOAD: usize = 500;

/// One decoded downlink frame.
///
/// Frames are immutable once parsed; the driver appends them to its inbox
/// until the application drains them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFrame {
    /// Received signal strength in dBm.
    pub rssi: i32,
    /// Signal-to-noise ratio in dB.
    pub snr: i32,
    /// Decoded payload length in bytes.
    pub len: usize,
    /// Port number the frame arrived on.
    pub port: i32,
    /// Whether the frame was addressed unicast (vs. multicast/broadcast).
    pub unicast: bool,
    /// Decoded payload bytes.
    pub payload: Vec<u8>,
}

impl ReceivedFrame {
    /// The payload as lossy UTF-8 text.
    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).to_string()
    }
}

/// A classified unsolicited event line.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The module joined the network (`+EVT:JOINED`).
    Joined,
    /// The module failed to join (`+EVT:JOIN_FAILED`).
    JoinFailed,
    /// An uplink transmission completed (`+EVT:TX_DONE`).
    TxDone,
    /// A link check report (`+EVT:LINKCHECK:...`), carried raw.
    LinkCheck(String),
    /// A received downlink frame (`+EVT:RX_...`).
    Rx(ReceivedFrame),
}

impl Event {
    /// Classify one line of module output.
    ///
    /// Returns `Ok(None)` for lines that are not events (command responses,
    /// echo, noise). Classification is by substring containment, join results
    /// first, so a line carrying multiple markers resolves deterministically.
    pub fn parse(line: &str) -> ProtocolResult<Option<Event>> {
        if line.contains("+EVT:JOINED") {
            return Ok(Some(Event::Joined));
        }
        if line.contains("+EVT:JOIN_FAILED") {
            return Ok(Some(Event::JoinFailed));
        }
        if line.contains("+EVT:TX_DONE") {
            return Ok(Some(Event::TxDone));
        }
        if line.contains("+EVT:RX_") {
            return Ok(Some(Event::Rx(parse_rx_frame(line)?)));
        }
        if line.contains("+EVT:LINKCHECK") {
            return Ok(Some(Event::LinkCheck(line.to_string())));
        }
        trace!("discarding non-event line: {}", line);
        Ok(None)
    }
}

/// Parse a received-frame event line.
///
/// Grammar: `+EVT:RX_<type>:<rssi>:<snr>:<UNICAST|other>:<port>:<hex>`.
/// Numeric fields parse permissively, a malformed integer reads as 0; a
/// missing field or an invalid or oversized payload is an error.
fn parse_rx_frame(line: &str) -> ProtocolResult<ReceivedFrame> {
    let start = line
        .find("+EVT:RX_")
        .ok_or_else(|| ProtocolError::MalformedFrame(line.to_string()))?;

    // Skip past the message-type field; it is part of the event name and
    // carries no meaning to the decoder.
    let rest = &line[start + "+EVT:RX_".len()..];
    let after_type = rest
        .find(':')
        .map(|i| &rest[i + 1..])
        .ok_or_else(|| ProtocolError::MalformedFrame(line.to_string()))?;

    let mut fields = after_type.splitn(4, ':');
    let rssi = parse_int(fields.next());
    let snr = parse_int(fields.next());
    let unicast = fields.next().map(|f| f == "UNICAST").unwrap_or(false);
    let tail = fields
        .next()
        .ok_or_else(|| ProtocolError::MalformedFrame(line.to_string()))?;

    let (port_field, hex_payload) = tail
        .split_once(':')
        .ok_or_else(|| ProtocolError::MalformedFrame(line.to_string()))?;
    let port = port_field.parse::<i32>().unwrap_or(0);

    let payload = hex::decode(hex_payload)?;
    if payload.len() > MAX_FRAME_PAYLOAD {
        return Err(ProtocolError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_FRAME_PAYLOAD,
        });
    }

    Ok(ReceivedFrame { rssi, snr, len: payload.len(), port, unicast, payload })
}

fn parse_int(field: Option<&str>) -> i32 {
    field.and_then(|f| f.parse().ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_joined() {
        assert_eq!(Event::parse("+EVT:JOINED").unwrap(), Some(Event::Joined));
    }

    #[test]
    fn test_parse_join_failed() {
        assert_eq!(Event::parse("+EVT:JOIN_FAILED").unwrap(), Some(Event::JoinFailed));
    }

    #[test]
    fn test_parse_tx_done() {
        assert_eq!(Event::parse("+EVT:TX_DONE").unwrap(), Some(Event::TxDone));
    }

    #[test]
    fn test_parse_linkcheck() {
        let event = Event::parse("+EVT:LINKCHECK:0:1:-30:8:1").unwrap();
        assert!(matches!(event, Some(Event::LinkCheck(_))));
    }

    #[test]
    fn test_non_event_line() {
        assert_eq!(Event::parse("OK").unwrap(), None);
        assert_eq!(Event::parse("AT+VER=1.2.3").unwrap(), None);
    }

    #[test]
    fn test_parse_rx_frame() {
        let event = Event::parse("+EVT:RX_1:-38:13:UNICAST:1:48656c6c6f").unwrap();
        let Some(Event::Rx(frame)) = event else {
            panic!("expected an RX frame");
        };
        assert_eq!(frame.rssi, -38);
        assert_eq!(frame.snr, 13);
        assert!(frame.unicast);
        assert_eq!(frame.port, 1);
        assert_eq!(frame.len, 5);
        assert_eq!(frame.payload_text(), "Hello");
    }

    #[test]
    fn test_parse_rx_frame_broadcast() {
        let event = Event::parse("+EVT:RX_2:-100:-4:MULTICAST:2:00ff").unwrap();
        let Some(Event::Rx(frame)) = event else {
            panic!("expected an RX frame");
        };
        assert!(!frame.unicast);
        assert_eq!(frame.payload, vec![0x00, 0xff]);
    }

    #[test]
    fn test_rx_frame_malformed_integers_yield_zero() {
        let event = Event::parse("+EVT:RX_1:abc:xyz:UNICAST:q:ff").unwrap();
        let Some(Event::Rx(frame)) = event else {
            panic!("expected an RX frame");
        };
        assert_eq!(frame.rssi, 0);
        assert_eq!(frame.snr, 0);
        assert_eq!(frame.port, 0);
    }

    #[test]
    fn test_rx_frame_missing_fields() {
        let err = Event::parse("+EVT:RX_1:-38:13").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedFrame(_)));
    }

    #[test]
    fn test_rx_frame_bad_payload() {
        let err = Event::parse("+EVT:RX_1:-38:13:UNICAST:1:abc").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedEncoding { len: 3 }));
    }

    #[test]
    fn test_rx_frame_oversized_payload() {
        let hex: String = "ab".repeat(MAX_FRAME_PAYLOAD + 1);
        let line = format!("+EVT:RX_1:-38:13:UNICAST:1:{}", hex);
        let err = Event::parse(&line).unwrap_err();
        assert!(matches!(err, ProtocolError::PayloadTooLarge { .. }));
    }
}
