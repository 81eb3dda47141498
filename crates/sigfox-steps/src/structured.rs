// crates/sigfox-steps/src/structured.rs
// ============================================================================
// Module: Structured Message Codec
// Description: Decoder for the compact structured sensor payload.
// Purpose: Expand 12-byte Sigfox payloads into named sensor fields.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! A structured payload is a hex string of 8-digit chunks. Each chunk holds a
//! 2-byte little-endian field name code followed by a 2-byte little-endian
//! value. A name code packs up to three 5-bit characters, most significant
//! first: `1..=26` map to `a..=z`, `27..` map to `0..`, and `0` is absent.
//! Values are tenths (`9990` decodes to `999`), or three packed characters for
//! fields listed as text fields.
//! Invariants:
//! - The payload length is a multiple of eight hex digits.
//! - Later chunks overwrite earlier chunks with the same name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Hex digits per field chunk.
pub const CHUNK_HEX_DIGITS: usize = 8;
/// Characters packed into one 16-bit code.
const CHARS_PER_CODE: u16 = 3;
/// Bits per packed character.
const BITS_PER_CHAR: u16 = 5;
/// Mask for one packed character.
const CHAR_MASK: u16 = 0x1f;
/// First code assigned to a digit.
const FIRST_DIGIT_CODE: u16 = 27;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Structured payload decoding errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// Payload contains a non-hex character.
    #[error("invalid hex in payload: {0}")]
    InvalidHex(String),
    /// Payload length is not a whole number of chunks.
    #[error("partial chunk in payload: {0}")]
    PartialChunk(String),
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Decodes a structured payload into body fields.
///
/// Fields named in `text_fields` decode as text; all others decode as numbers.
///
/// # Errors
///
/// Returns [`PayloadError`] when `data` is not hex or ends in a partial chunk.
pub fn decode_message<T: AsRef<str>>(
    data: &str,
    text_fields: &[T],
) -> Result<Map<String, Value>, PayloadError> {
    if data.len() % CHUNK_HEX_DIGITS != 0 {
        return Err(PayloadError::PartialChunk(format!(
            "{} hex digits is not a multiple of {CHUNK_HEX_DIGITS}",
            data.len()
        )));
    }
    let mut fields = Map::new();
    for (index, chunk) in data.as_bytes().chunks(CHUNK_HEX_DIGITS).enumerate() {
        let offset = index * CHUNK_HEX_DIGITS;
        let (name_hex, value_hex) = chunk.split_at(CHUNK_HEX_DIGITS / 2);
        let name = decode_text(read_le_u16(name_hex, offset)?);
        let code = read_le_u16(value_hex, offset + CHUNK_HEX_DIGITS / 2)?;
        let value = if text_fields.iter().any(|field| field.as_ref() == name) {
            Value::String(decode_text(code))
        } else {
            tenths(code)
        };
        fields.insert(name, value);
    }
    Ok(fields)
}

/// Decodes up to three packed characters from a 16-bit code.
///
/// Absent characters are skipped, so `0x1380` decodes to `"d1"`.
#[must_use]
pub fn decode_text(code: u16) -> String {
    (0 .. CHARS_PER_CODE)
        .rev()
        .filter_map(|position| decode_char((code >> (position * BITS_PER_CHAR)) & CHAR_MASK))
        .collect()
}

/// Maps one 5-bit character code to its character.
pub(crate) fn decode_char(code: u16) -> Option<char> {
    let (base, delta) = match code {
        0 => return None,
        1 .. FIRST_DIGIT_CODE => (b'a', code - 1),
        _ => (b'0', code - FIRST_DIGIT_CODE),
    };
    u8::try_from(delta).ok().and_then(|delta| base.checked_add(delta)).map(char::from)
}

/// Reads four hex digits as a little-endian 16-bit value.
pub(crate) fn read_le_u16(hex: &[u8], offset: usize) -> Result<u16, PayloadError> {
    let mut nibbles = [0_u16; 4];
    for (slot, (position, byte)) in nibbles.iter_mut().zip(hex.iter().enumerate()) {
        *slot = char::from(*byte)
            .to_digit(16)
            .and_then(|digit| u16::try_from(digit).ok())
            .ok_or_else(|| {
                PayloadError::InvalidHex(format!(
                    "character '{}' at offset {}",
                    char::from(*byte),
                    offset + position
                ))
            })?;
    }
    let [low_high, low_low, high_high, high_low] = nibbles;
    Ok((high_high << 12) | (high_low << 8) | (low_high << 4) | low_low)
}

/// Converts a tenths value to JSON, keeping whole numbers integral.
pub(crate) fn tenths(code: u16) -> Value {
    if code % 10 == 0 {
        return Value::from(code / 10);
    }
    Number::from_f64(f64::from(code) / 10.0).map_or(Value::Null, Value::Number)
}
