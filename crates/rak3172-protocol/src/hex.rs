//! Hex codec for AT payload framing.
//!
//! The RAK3172 carries binary payloads as hex text on the wire: every byte
//! becomes two lowercase hex digits. Decoding is strict: an odd-length or
//! non-hex input is an error, never a silent passthrough.

use crate::error::{ProtocolError, ProtocolResult};

/// Encode a byte slice as lowercase hex. Output length is always twice the
/// input length; an empty input yields an empty string.
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

/// Decode a hex string into bytes.
///
/// Fails with [`ProtocolError::MalformedEncoding`] on odd-length input and
/// [`ProtocolError::InvalidHexDigit`] on any character outside `[0-9a-fA-F]`.
pub fn decode(s: &str) -> ProtocolResult<Vec<u8>> {
    if s.len() % 2 != 0 {
        return Err(ProtocolError::MalformedEncoding { len: s.len() });
    }

    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(s.len() / 2);
    for i in (0..bytes.len()).step_by(2) {
        let hi = hex_digit(bytes[i]).ok_or(ProtocolError::InvalidHexDigit { position: i })?;
        let lo = hex_digit(bytes[i + 1]).ok_or(ProtocolError::InvalidHexDigit { position: i + 1 })?;
        out.push((hi << 4) | lo);
    }
    Ok(out)
}

/// Decode a hex string into text (lossy UTF-8).
///
/// This is the text-payload path: the module delivers downlink text payloads
/// hex-encoded, and non-UTF-8 bytes are replaced rather than rejected.
pub fn decode_to_text(s: &str) -> ProtocolResult<String> {
    let bytes = decode(s)?;
    Ok(String::from_utf8_lossy(&bytes).to_string())
}

/// Check that a string is exactly `len` characters and all hex digits.
///
/// Used by setters for fixed-length identifiers and keys (DevEUI, AppKey,
/// DevAddr and friends) before any command is built.
pub fn is_hex_string(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| hex_digit(b).is_some())
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
