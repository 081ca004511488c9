//! Hex text to bytes and back.
//!
//! Input is forgiving about separators so dumps can be pasted from serial
//! monitors or Python reprs: `57AB000F0011`, `57 AB 00 0F 00 11` and
//! `0x57,0xAB,0x00,0x0F,0x00,0x11` all read the same.

use hex::FromHexError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexError {
    #[error("invalid hex digit {digit:?} at position {position}")]
    InvalidDigit { digit: char, position: usize },

    #[error("odd number of hex digits in {0:?}")]
    OddLength(String),
}

/// Parses hex text into bytes.
///
/// Whitespace, commas, colons and `0x`/`0X` prefixes separate bytes. Inside
/// a separated group, digits are read in pairs.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, HexError> {
    let mut bytes = Vec::new();
    let mut offset = 0;

    for group in text.split(|c: char| c.is_whitespace() || c == ',' || c == ':') {
        let start = offset;
        offset += group.len() + 1;

        let (digits, skipped) = match group.strip_prefix("0x").or_else(|| group.strip_prefix("0X")) {
            Some(rest) => (rest, 2),
            None => (group, 0),
        };
        if digits.is_empty() {
            continue;
        }

        let decoded = hex::decode(digits).map_err(|err| match err {
            FromHexError::InvalidHexCharacter { c, index } => HexError::InvalidDigit {
                digit: c,
                position: start + skipped + index,
            },
            _ => HexError::OddLength(group.to_string()),
        })?;
        bytes.extend_from_slice(&decoded);
    }
    Ok(bytes)
}

/// Formats bytes as upper-case hex separated by single spaces.
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| hex::encode_upper([*b]))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESET: [u8; 6] = [0x57, 0xAB, 0x00, 0x0F, 0x00, 0x11];

    #[test]
    fn test_accepts_common_dump_styles() {
        assert_eq!(parse_hex("57AB000F0011").unwrap(), RESET);
        assert_eq!(parse_hex("57 ab 00 0f 00 11").unwrap(), RESET);
        assert_eq!(parse_hex("0x57,0xAB,0x00,0x0F,0x00,0x11").unwrap(), RESET);
        assert_eq!(parse_hex("57:AB:00:0F:00:11\n").unwrap(), RESET);
    }

    #[test]
    fn test_empty_input_is_empty_bytes() {
        assert_eq!(parse_hex("").unwrap(), Vec::<u8>::new());
        assert_eq!(parse_hex("  ,, ").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_odd_group_is_rejected() {
        assert_eq!(
            parse_hex("57 ABC"),
            Err(HexError::OddLength("ABC".to_string()))
        );
    }

    #[test]
    fn test_bad_digit_reports_position() {
        assert_eq!(
            parse_hex("57 AG"),
            Err(HexError::InvalidDigit {
                digit: 'G',
                position: 4
            })
        );
    }

    #[test]
    fn test_uppercase_prefix_and_mixed_case_digits() {
        assert_eq!(parse_hex("0X57 0xaB").unwrap(), [0x57, 0xAB]);
    }

    #[test]
    fn test_bad_digit_after_prefix_reports_position() {
        assert_eq!(
            parse_hex("0x5Z"),
            Err(HexError::InvalidDigit {
                digit: 'Z',
                position: 3
            })
        );
    }

    #[test]
    fn test_format_hex_is_spaced_upper_case() {
        assert_eq!(format_hex(&RESET), "57 AB 00 0F 00 11");
        assert_eq!(format_hex(&[]), "");
    }
}
