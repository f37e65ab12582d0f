//! Modified UTF-8 encode/decode, as used by the `Utf8` constant pool tag (JVMS §4.4.7).
//!
//! Modified UTF-8 differs from standard UTF-8 in two ways: the null character is encoded as
//! the two-byte sequence `0xC0 0x80` instead of a single zero byte, and characters outside the
//! basic multilingual plane are encoded as a surrogate pair of three-byte sequences rather than
//! a single four-byte sequence.

use crate::Error::InvalidMutf8;
use crate::Result;

/// Decode modified UTF-8 bytes into a `String`.
///
/// # Errors
///
/// if the bytes are not valid modified UTF-8.
pub fn from_bytes(bytes: &[u8]) -> Result<String> {
    let mut chars = Vec::new();
    let mut iter = bytes.iter().copied().peekable();

    while let Some(byte) = iter.next() {
        let code_point = if byte & 0x80 == 0 {
            u32::from(byte)
        } else if byte & 0xE0 == 0xC0 {
            let byte2 = next_continuation(&mut iter)?;
            (u32::from(byte & 0x1F) << 6) | u32::from(byte2 & 0x3F)
        } else if byte & 0xF0 == 0xE0 {
            let byte2 = next_continuation(&mut iter)?;
            let byte3 = next_continuation(&mut iter)?;
            let high = (u32::from(byte & 0x0F) << 12)
                | (u32::from(byte2 & 0x3F) << 6)
                | u32::from(byte3 & 0x3F);
            // A surrogate pair is encoded as two consecutive three-byte sequences.
            if (0xD800..=0xDBFF).contains(&high) {
                let Some(0xED) = iter.next() else {
                    return Err(InvalidMutf8("expected low surrogate".to_string()));
                };
                let byte5 = next_continuation(&mut iter)?;
                let byte6 = next_continuation(&mut iter)?;
                let low = (u32::from(byte5 & 0x3F) << 6) | u32::from(byte6 & 0x3F) | 0xDC00;
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            } else {
                high
            }
        } else {
            return Err(InvalidMutf8(format!("invalid leading byte: {byte:#04x}")));
        };

        let character =
            char::from_u32(code_point).ok_or_else(|| InvalidMutf8("invalid code point".to_string()))?;
        chars.push(character);
    }

    Ok(chars.into_iter().collect())
}

fn next_continuation(iter: &mut std::iter::Peekable<impl Iterator<Item = u8>>) -> Result<u8> {
    iter.next()
        .ok_or_else(|| InvalidMutf8("truncated sequence".to_string()))
}

/// Encode a `&str` into modified UTF-8 bytes.
///
/// # Errors
///
/// This currently never fails, but returns a `Result` for symmetry with [`from_bytes`] and to
/// leave room for a future length check.
pub fn to_bytes(value: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(value.len());
    for character in value.chars() {
        let code_point = character as u32;
        if code_point == 0 {
            bytes.extend_from_slice(&[0xC0, 0x80]);
        } else if code_point <= 0x7F {
            bytes.push(code_point as u8);
        } else if code_point <= 0x7FF {
            bytes.push(0xC0 | (code_point >> 6) as u8);
            bytes.push(0x80 | (code_point & 0x3F) as u8);
        } else if code_point <= 0xFFFF {
            bytes.push(0xE0 | (code_point >> 12) as u8);
            bytes.push(0x80 | ((code_point >> 6) & 0x3F) as u8);
            bytes.push(0x80 | (code_point & 0x3F) as u8);
        } else {
            let adjusted = code_point - 0x10000;
            let high = 0xD800 + (adjusted >> 10);
            let low = 0xDC00 + (adjusted & 0x3FF);
            for surrogate in [high, low] {
                bytes.push(0xE0 | (surrogate >> 12) as u8);
                bytes.push(0x80 | ((surrogate >> 6) & 0x3F) as u8);
                bytes.push(0x80 | (surrogate & 0x3F) as u8);
            }
        }
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_round_trip() -> Result<()> {
        let value = "Hello, World!";
        let bytes = to_bytes(value)?;
        assert_eq!(value, from_bytes(&bytes)?);
        Ok(())
    }

    #[test]
    fn test_null_character() -> Result<()> {
        let value = "a\0b";
        let bytes = to_bytes(value)?;
        assert_eq!(bytes, vec![b'a', 0xC0, 0x80, b'b']);
        assert_eq!(value, from_bytes(&bytes)?);
        Ok(())
    }

    #[test]
    fn test_supplementary_plane_round_trip() -> Result<()> {
        let value = "\u{1F600}"; // outside the BMP, needs a surrogate pair
        let bytes = to_bytes(value)?;
        assert_eq!(bytes.len(), 6);
        assert_eq!(value, from_bytes(&bytes)?);
        Ok(())
    }
}
