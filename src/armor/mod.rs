//! ASCII armor encoding and decoding.
//!
//! Binary key material and encrypted messages travel between users as
//! text (copy/paste, email), wrapped in the RFC 4880 armor layout:
//! a type-tagged `-----BEGIN ...-----` line, optional `Key: Value`
//! headers, base64 data in 64-column lines, a CRC-24 checksum line,
//! and the matching `-----END ...-----` line.
//!
//! Decoding is strict. Unknown type tokens, characters outside the
//! base64 alphabet, bad padding, a missing or mismatching checksum,
//! a mismatching end line, or trailing garbage all fail with an
//! [`CryptError::Armor`] error instead of attempting recovery, so
//! transcription damage is caught before any cryptographic processing
//! starts.

use crate::error::{CryptError, Result};
use crate::validation::Validator;
use std::collections::HashMap;

/// CRC-24 polynomial used for PGP armor checksums
const CRC24_POLY: u32 = 0x1864CFB;
const CRC24_INIT: u32 = 0xB704CE;

/// Width of base64 data lines in armored output
const ARMOR_LINE_WIDTH: usize = 64;

/// ASCII armor block types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmorKind {
    /// Public key block
    PublicKey,
    /// Passphrase-protected private key block
    PrivateKey,
    /// Encrypted message
    Message,
}

impl ArmorKind {
    /// Returns the armor label for this block type.
    pub fn label(&self) -> &'static str {
        match self {
            ArmorKind::PublicKey => "PGP PUBLIC KEY BLOCK",
            ArmorKind::PrivateKey => "PGP PRIVATE KEY BLOCK",
            ArmorKind::Message => "PGP MESSAGE",
        }
    }

    /// Parses an armor label. Unknown labels are a hard error.
    pub fn from_label(label: &str) -> Result<Self> {
        match label {
            "PGP PUBLIC KEY BLOCK" => Ok(ArmorKind::PublicKey),
            "PGP PRIVATE KEY BLOCK" => Ok(ArmorKind::PrivateKey),
            "PGP MESSAGE" => Ok(ArmorKind::Message),
            other => Err(CryptError::armor(format!(
                "Unknown armor type: '{}'",
                other
            ))),
        }
    }
}

/// A decoded armor block: its type, headers, and payload bytes.
#[derive(Debug, Clone)]
pub struct Armored {
    /// The block type from the BEGIN/END lines
    pub kind: ArmorKind,
    /// `Key: Value` headers between the BEGIN line and the data
    pub headers: HashMap<String, String>,
    /// The decoded binary payload
    pub data: Vec<u8>,
}

impl Armored {
    /// Returns a header value by key.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}

/// Calculate the CRC-24 checksum used in PGP armor.
pub fn crc24(data: &[u8]) -> u32 {
    let mut crc = CRC24_INIT;

    for &byte in data {
        crc ^= (byte as u32) << 16;
        for _ in 0..8 {
            if (crc & 0x800000) != 0 {
                crc = (crc << 1) ^ CRC24_POLY;
            } else {
                crc <<= 1;
            }
            crc &= 0xFFFFFF;
        }
    }

    crc
}

/// Encode binary data as an ASCII armored block.
pub fn encode(data: &[u8], kind: ArmorKind) -> String {
    encode_with_headers(data, kind, &HashMap::new())
}

/// Encode binary data as an ASCII armored block with custom headers.
pub fn encode_with_headers(
    data: &[u8],
    kind: ArmorKind,
    headers: &HashMap<String, String>,
) -> String {
    let mut output = String::new();

    output.push_str("-----BEGIN ");
    output.push_str(kind.label());
    output.push_str("-----\n");

    for (key, value) in headers {
        output.push_str(key);
        output.push_str(": ");
        output.push_str(value);
        output.push('\n');
    }
    if !headers.is_empty() {
        output.push('\n');
    }

    let encoded = base64_encode(data);
    for line in encoded.as_bytes().chunks(ARMOR_LINE_WIDTH) {
        // chunks of an ASCII string are valid UTF-8
        output.push_str(std::str::from_utf8(line).expect("base64 output is ASCII"));
        output.push('\n');
    }

    let checksum = crc24(data);
    let checksum_bytes = [
        ((checksum >> 16) & 0xFF) as u8,
        ((checksum >> 8) & 0xFF) as u8,
        (checksum & 0xFF) as u8,
    ];
    output.push('=');
    output.push_str(&base64_encode(&checksum_bytes));
    output.push('\n');

    output.push_str("-----END ");
    output.push_str(kind.label());
    output.push_str("-----\n");

    output
}

/// Parser position while walking the armor lines.
enum DecodeState {
    BeforeBegin,
    Headers,
    Data,
    AfterEnd,
}

/// Decode an ASCII armored block to binary data.
///
/// The whole input must be one armor block; anything other than blank
/// lines before BEGIN or after END is rejected.
pub fn decode(armored_text: &str) -> Result<Armored> {
    Validator::validate_armor_size(armored_text)?;

    let mut state = DecodeState::BeforeBegin;
    let mut kind: Option<ArmorKind> = None;
    let mut headers = HashMap::new();
    let mut base64_data = String::new();
    let mut checksum: Option<u32> = None;

    for line in armored_text.lines() {
        let line = line.trim_end_matches('\r');
        let trimmed = line.trim();

        match state {
            DecodeState::BeforeBegin => {
                if trimmed.is_empty() {
                    continue;
                }
                let label = trimmed
                    .strip_prefix("-----BEGIN ")
                    .and_then(|rest| rest.strip_suffix("-----"))
                    .ok_or_else(|| CryptError::armor("Expected BEGIN line"))?;
                kind = Some(ArmorKind::from_label(label)?);
                state = DecodeState::Headers;
            }
            DecodeState::Headers => {
                if trimmed.is_empty() {
                    state = DecodeState::Data;
                } else if let Some((key, value)) = trimmed.split_once(": ") {
                    headers.insert(key.to_string(), value.to_string());
                } else {
                    // First data line; no headers present
                    state = DecodeState::Data;
                    consume_data_line(trimmed, &mut base64_data, &mut checksum)?;
                }
            }
            DecodeState::Data => {
                if trimmed.is_empty() {
                    return Err(CryptError::armor("Blank line inside armor data"));
                }
                if let Some(label) = trimmed
                    .strip_prefix("-----END ")
                    .and_then(|rest| rest.strip_suffix("-----"))
                {
                    let expected = kind.unwrap().label();
                    if label != expected {
                        return Err(CryptError::armor(format!(
                            "End line mismatch: expected '{}', got '{}'",
                            expected, label
                        )));
                    }
                    state = DecodeState::AfterEnd;
                } else {
                    if checksum.is_some() {
                        return Err(CryptError::armor("Data after checksum line"));
                    }
                    consume_data_line(trimmed, &mut base64_data, &mut checksum)?;
                }
            }
            DecodeState::AfterEnd => {
                if !trimmed.is_empty() {
                    return Err(CryptError::armor("Trailing garbage after END line"));
                }
            }
        }
    }

    if !matches!(state, DecodeState::AfterEnd) {
        return Err(CryptError::armor("Missing or incomplete armor block"));
    }

    let data = base64_decode(base64_data.as_bytes())?;

    let expected = checksum.ok_or_else(|| CryptError::armor("Missing checksum line"))?;
    let actual = crc24(&data);
    if actual != expected {
        return Err(CryptError::armor(format!(
            "Checksum mismatch: expected {:06X}, got {:06X}",
            expected, actual
        )));
    }

    Ok(Armored {
        kind: kind.unwrap(),
        headers,
        data,
    })
}

/// Handle one line of the data section: base64 payload or `=XXXX` checksum.
fn consume_data_line(
    trimmed: &str,
    base64_data: &mut String,
    checksum: &mut Option<u32>,
) -> Result<()> {
    if let Some(checksum_b64) = trimmed.strip_prefix('=') {
        let bytes = base64_decode(checksum_b64.as_bytes())?;
        if bytes.len() != 3 {
            return Err(CryptError::armor("Invalid checksum length"));
        }
        *checksum = Some(((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | (bytes[2] as u32));
        return Ok(());
    }

    if trimmed.len() > ARMOR_LINE_WIDTH + 4 {
        return Err(CryptError::armor("Armor data line too long"));
    }

    base64_data.push_str(trimmed);
    Ok(())
}

const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Encode binary data as base64 (RFC 4648).
fn base64_encode(data: &[u8]) -> String {
    let mut result = String::with_capacity(data.len().div_ceil(3) * 4);

    for chunk in data.chunks(3) {
        let mut group = (chunk[0] as u32) << 16;
        if chunk.len() > 1 {
            group |= (chunk[1] as u32) << 8;
        }
        if chunk.len() > 2 {
            group |= chunk[2] as u32;
        }

        result.push(BASE64_CHARS[((group >> 18) & 0x3F) as usize] as char);
        result.push(BASE64_CHARS[((group >> 12) & 0x3F) as usize] as char);
        result.push(if chunk.len() > 1 {
            BASE64_CHARS[((group >> 6) & 0x3F) as usize] as char
        } else {
            '='
        });
        result.push(if chunk.len() > 2 {
            BASE64_CHARS[(group & 0x3F) as usize] as char
        } else {
            '='
        });
    }

    result
}

/// Decode base64 data (RFC 4648), strictly.
///
/// Input length must be a multiple of four; `=` padding may appear
/// only in the last one or two positions.
fn base64_decode(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() % 4 != 0 {
        return Err(CryptError::armor(format!(
            "Base64 length {} is not a multiple of four",
            data.len()
        )));
    }

    let mut result = Vec::with_capacity(data.len() / 4 * 3);

    for (group_index, group) in data.chunks(4).enumerate() {
        let is_last_group = (group_index + 1) * 4 == data.len();
        let mut acc = 0u32;
        let mut chars = 0;

        for (i, &c) in group.iter().enumerate() {
            if c == b'=' {
                // Padding is only legal in the last two slots of the final group
                if !is_last_group || i < 2 {
                    return Err(CryptError::armor("Misplaced base64 padding"));
                }
                if group[i..].iter().any(|&p| p != b'=') {
                    return Err(CryptError::armor("Misplaced base64 padding"));
                }
                break;
            }

            let value = match c {
                b'A'..=b'Z' => c - b'A',
                b'a'..=b'z' => c - b'a' + 26,
                b'0'..=b'9' => c - b'0' + 52,
                b'+' => 62,
                b'/' => 63,
                _ => {
                    return Err(CryptError::armor(format!(
                        "Invalid base64 character: {:?}",
                        c as char
                    )))
                }
            };

            acc = (acc << 6) | (value as u32);
            chars += 1;
        }

        match chars {
            4 => {
                result.push(((acc >> 16) & 0xFF) as u8);
                result.push(((acc >> 8) & 0xFF) as u8);
                result.push((acc & 0xFF) as u8);
            }
            3 => {
                acc <<= 6;
                result.push(((acc >> 16) & 0xFF) as u8);
                result.push(((acc >> 8) & 0xFF) as u8);
            }
            2 => {
                acc <<= 12;
                result.push(((acc >> 16) & 0xFF) as u8);
            }
            _ => return Err(CryptError::armor("Truncated base64 group")),
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_encoding() {
        assert_eq!(base64_encode(b"Hello, World!"), "SGVsbG8sIFdvcmxkIQ==");
        assert_eq!(base64_encode(b""), "");
    }

    #[test]
    fn test_base64_decoding() {
        assert_eq!(
            base64_decode(b"SGVsbG8sIFdvcmxkIQ==").unwrap(),
            b"Hello, World!"
        );
    }

    #[test]
    fn test_base64_roundtrip() {
        let original = b"The quick brown fox jumps over the lazy dog";
        let encoded = base64_encode(original);
        let decoded = base64_decode(encoded.as_bytes()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_base64_strictness() {
        // Not a multiple of four
        assert!(base64_decode(b"SGVsbG8").is_err());
        // Padding in the middle
        assert!(base64_decode(b"SG=sbG8sIFdvcmxkIQ==").is_err());
        // Non-alphabet character
        assert!(base64_decode(b"SGVs!G8s").is_err());
        // Padding in a non-final group
        assert!(base64_decode(b"SGVsbG8=IFdvcmxkIQ==").is_err());
    }

    #[test]
    fn test_armor_kind_labels() {
        assert_eq!(
            ArmorKind::from_label("PGP MESSAGE").unwrap(),
            ArmorKind::Message
        );
        assert_eq!(
            ArmorKind::from_label("PGP PUBLIC KEY BLOCK").unwrap(),
            ArmorKind::PublicKey
        );
        assert!(ArmorKind::from_label("PGP SIGNATURE").is_err());
        assert!(ArmorKind::from_label("SOMETHING ELSE").is_err());
    }

    #[test]
    fn test_armor_roundtrip() {
        let original = b"This is a test payload for armor encoding and decoding.";

        let mut headers = HashMap::new();
        headers.insert("Version".to_string(), "CryptedHype 0.1.0".to_string());
        let armored = encode_with_headers(original, ArmorKind::Message, &headers);

        let decoded = decode(&armored).unwrap();
        assert_eq!(decoded.kind, ArmorKind::Message);
        assert_eq!(decoded.data, original);
        assert_eq!(decoded.header("Version"), Some("CryptedHype 0.1.0"));
    }

    #[test]
    fn test_armor_roundtrip_without_headers() {
        let data = b"no headers here";
        let armored = encode(data, ArmorKind::PublicKey);

        assert!(armored.starts_with("-----BEGIN PGP PUBLIC KEY BLOCK-----"));
        assert!(armored.ends_with("-----END PGP PUBLIC KEY BLOCK-----\n"));

        let decoded = decode(&armored).unwrap();
        assert!(decoded.headers.is_empty());
        assert_eq!(decoded.data, data);
    }

    #[test]
    fn test_empty_payload_roundtrip() {
        let armored = encode(b"", ArmorKind::Message);
        let decoded = decode(&armored).unwrap();
        assert!(decoded.data.is_empty());
    }

    #[test]
    fn test_long_payload_wraps_lines() {
        let data = vec![42u8; 500];
        let armored = encode(&data, ArmorKind::Message);

        for line in armored.lines() {
            assert!(line.len() <= ARMOR_LINE_WIDTH + 32);
        }

        let decoded = decode(&armored).unwrap();
        assert_eq!(decoded.data, data);
    }

    #[test]
    fn test_missing_checksum_rejected() {
        let armored = "-----BEGIN PGP MESSAGE-----\n\nSGVsbG8gV29ybGQ=\n-----END PGP MESSAGE-----\n";
        let err = decode(armored).unwrap_err();
        assert!(matches!(err, CryptError::Armor(_)));
    }

    #[test]
    fn test_checksum_mismatch_rejected() {
        let armored =
            "-----BEGIN PGP MESSAGE-----\n\nSGVsbG8gV29ybGQ=\n=AAAA\n-----END PGP MESSAGE-----\n";
        assert!(decode(armored).is_err());
    }

    #[test]
    fn test_end_line_mismatch_rejected() {
        let data = b"payload";
        let armored = encode(data, ArmorKind::Message)
            .replace("-----END PGP MESSAGE-----", "-----END PGP PUBLIC KEY BLOCK-----");
        assert!(decode(&armored).is_err());
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let mut armored = encode(b"payload", ArmorKind::Message);
        armored.push_str("extra line\n");
        assert!(decode(&armored).is_err());
    }

    #[test]
    fn test_single_character_corruption_detected() {
        let data: Vec<u8> = (0u8..=255).collect();
        let armored = encode(&data, ArmorKind::Message);

        // Flip every data character in turn; each corruption must be caught
        let begin_end: Vec<usize> = armored
            .char_indices()
            .filter(|(_, c)| c.is_ascii_alphanumeric())
            .map(|(i, _)| i)
            .collect();

        for &i in begin_end.iter().step_by(17) {
            let mut corrupted = armored.clone().into_bytes();
            corrupted[i] = if corrupted[i] == b'A' { b'B' } else { b'A' };
            let corrupted = String::from_utf8(corrupted).unwrap();
            if corrupted == armored {
                continue;
            }
            assert!(
                decode(&corrupted).is_err(),
                "corruption at byte {} went undetected",
                i
            );
        }
    }

    #[test]
    fn test_not_armor_at_all() {
        assert!(decode("This is not valid armor data").is_err());
        assert!(decode("").is_err());
    }
}
