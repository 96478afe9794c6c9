//! Single-byte text decoding of message payloads.
//!
//! Payloads are plain 7-bit ASCII text. Anything outside that range is
//! rejected with a [`DecodeError`] instead of being lossily replaced, so the
//! dashboard never shows a value that was not actually sent.

/// A payload byte outside the ASCII range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("payload is not ASCII: byte 0x{byte:02x} at offset {position}")]
pub struct DecodeError {
    pub position: usize,
    pub byte: u8,
}

/// Decodes `bytes` as ASCII text.
pub fn decode_payload(bytes: &[u8]) -> Result<String, DecodeError> {
    if let Some(position) = bytes.iter().position(|b| !b.is_ascii()) {
        return Err(DecodeError {
            position,
            byte: bytes[position],
        });
    }
    // ASCII is a subset of UTF-8, one char per byte.
    Ok(bytes.iter().map(|&b| char::from(b)).collect())
}
