//! Fixed-Width Hex Record Codec
//!
//! Splits an input stream into 64-character (256-bit) hex fields and turns
//! integers back into such fields.
//!
//! Layout:
//! - Fields are concatenated with no delimiter
//! - Each field is a big-endian unsigned integer, zero-padded on the left
//! - A trailing partial field is dropped without error
//!
//! Two on-disk encodings are supported. `Text` files hold the ASCII digits
//! themselves. `Binary` files hold raw 32-byte words, each of which is read
//! as its 64 lowercase hex digits.

use num_bigint::BigUint;
use num_traits::Zero;
use serde::Deserialize;

use crate::constants::{PAD_CHAR, RECORD_BYTES, RECORD_WIDTH};
use crate::types::{HexRecord, RecordList, TallyError};

/// How record bytes are laid out in a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordEncoding {
    /// One ASCII hex digit per byte
    #[default]
    Text,
    /// Raw big-endian words, two hex digits per byte
    Binary,
}

/// What to do with a character that is not a hex digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigitPolicy {
    /// Reject the record with `TallyError::InvalidRecord`
    #[default]
    Strict,
    /// Count the digit as 0 and keep going
    Lenient,
}

/// Decode a raw byte stream into records
///
/// Never fails and never looks at character class. Only full fields are
/// emitted; the remainder is discarded.
pub fn decode(bytes: &[u8], encoding: RecordEncoding) -> RecordList {
    match encoding {
        RecordEncoding::Text => bytes
            .chunks_exact(RECORD_WIDTH)
            .map(|chunk| HexRecord::new(chunk.iter().map(|&b| b as char).collect::<String>()))
            .collect(),
        RecordEncoding::Binary => bytes
            .chunks_exact(RECORD_BYTES)
            .map(|chunk| HexRecord::new(hex::encode(chunk)))
            .collect(),
    }
}

/// Turn a record into its integer value
///
/// Reads exactly `RECORD_WIDTH` digits, most significant first. Anything
/// past the last digit is ignored. A short record is an error under
/// `Strict`; under `Lenient` each missing digit counts as 0.
pub fn decode_to_integer(record: &str, policy: DigitPolicy) -> Result<BigUint, TallyError> {
    let mut digits = record.chars();
    let mut value = BigUint::zero();

    for position in 0..RECORD_WIDTH {
        let found = digits.next();
        let digit = match found.and_then(|c| c.to_digit(16)) {
            Some(d) => d,
            None if policy == DigitPolicy::Lenient => 0,
            None => return Err(TallyError::InvalidRecord { position, found }),
        };
        value = value * 16u32 + digit;
    }

    Ok(value)
}

/// Encode an integer as a zero-padded hex field
///
/// Digits are always lowercase, so a record read with uppercase digits
/// comes back lowercased; lowercase is the canonical form.
///
/// Values wider than the field come back wider than `RECORD_WIDTH`; no
/// digits are dropped. Use [`encode_checked`] to reject them instead.
pub fn encode(value: &BigUint) -> String {
    let digits = value.to_str_radix(16);
    let mut field = String::with_capacity(RECORD_WIDTH.max(digits.len()));
    for _ in digits.len()..RECORD_WIDTH {
        field.push(PAD_CHAR);
    }
    field.push_str(&digits);
    field
}

/// Like [`encode`], but fails when the value does not fit in one field
pub fn encode_checked(value: &BigUint) -> Result<String, TallyError> {
    let field = encode(value);
    if field.len() > RECORD_WIDTH {
        return Err(TallyError::FieldOverflow {
            width: RECORD_WIDTH,
            digits: field.len(),
        });
    }
    Ok(field)
}

/// Encode a value into the bytes that go to disk for one field
pub fn encode_field(value: &BigUint, encoding: RecordEncoding) -> Result<Vec<u8>, TallyError> {
    let field = encode_checked(value)?;
    match encoding {
        RecordEncoding::Text => Ok(field.into_bytes()),
        RecordEncoding::Binary => {
            // encode_checked guarantees at most RECORD_BYTES bytes here
            let be = value.to_bytes_be();
            let mut word = vec![0u8; RECORD_BYTES];
            let start = RECORD_BYTES - be.len();
            word[start..].copy_from_slice(&be);
            Ok(word)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zeros(n: usize) -> String {
        "0".repeat(n)
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode(b"", RecordEncoding::Text).is_empty());
        assert!(decode(b"", RecordEncoding::Binary).is_empty());
    }

    #[test]
    fn test_decode_splits_in_order() {
        let first = format!("{}1", zeros(63));
        let second = format!("{}2", zeros(63));
        let stream = format!("{}{}", first, second);

        let records = decode(stream.as_bytes(), RecordEncoding::Text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].as_str(), first);
        assert_eq!(records[1].as_str(), second);
    }

    #[test]
    fn test_decode_drops_partial_tail() {
        let stream = format!("{}abcdef", "f".repeat(64));
        assert_eq!(stream.len(), 70);

        let records = decode(stream.as_bytes(), RecordEncoding::Text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].as_str(), "f".repeat(64));
    }

    #[test]
    fn test_decode_does_not_validate() {
        let stream = "z".repeat(64);
        let records = decode(stream.as_bytes(), RecordEncoding::Text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].as_str(), stream);
    }

    #[test]
    fn test_decode_binary_words() {
        let mut bytes = vec![0u8; 32];
        bytes[31] = 0x05;
        bytes.extend_from_slice(&[0xff; 10]); // partial word

        let records = decode(&bytes, RecordEncoding::Binary);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].as_str(), format!("{}05", zeros(62)));
    }

    #[test]
    fn test_decode_to_integer_zero() {
        let value = decode_to_integer(&zeros(64), DigitPolicy::Strict).unwrap();
        assert!(value.is_zero());
    }

    #[test]
    fn test_decode_to_integer_low_digit() {
        let record = format!("{}a", zeros(63));
        let value = decode_to_integer(&record, DigitPolicy::Strict).unwrap();
        assert_eq!(value, BigUint::from(10u32));
    }

    #[test]
    fn test_decode_to_integer_accepts_uppercase() {
        let record = format!("{}FF", zeros(62));
        let value = decode_to_integer(&record, DigitPolicy::Strict).unwrap();
        assert_eq!(value, BigUint::from(255u32));
    }

    #[test]
    fn test_decode_to_integer_ignores_extra_digits() {
        let record = format!("{}1ffff", zeros(63));
        let value = decode_to_integer(&record, DigitPolicy::Strict).unwrap();
        assert_eq!(value, BigUint::from(1u32));
    }

    #[test]
    fn test_decode_to_integer_max() {
        let value = decode_to_integer(&"f".repeat(64), DigitPolicy::Strict).unwrap();
        let expected = (BigUint::from(1u32) << 256usize) - 1u32;
        assert_eq!(value, expected);
    }

    #[test]
    fn test_strict_rejects_bad_digit() {
        let record = format!("{}g{}", zeros(10), zeros(53));
        match decode_to_integer(&record, DigitPolicy::Strict) {
            Err(TallyError::InvalidRecord { position, found }) => {
                assert_eq!(position, 10);
                assert_eq!(found, Some('g'));
            }
            other => panic!("expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_rejects_short_record() {
        match decode_to_integer("ff", DigitPolicy::Strict) {
            Err(TallyError::InvalidRecord { position, found }) => {
                assert_eq!(position, 2);
                assert_eq!(found, None);
            }
            other => panic!("expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_lenient_treats_bad_digit_as_zero() {
        let record = format!("{}x1", zeros(62));
        let value = decode_to_integer(&record, DigitPolicy::Lenient).unwrap();
        assert_eq!(value, BigUint::from(1u32));
    }

    #[test]
    fn test_lenient_shifts_short_record() {
        // "1" followed by 63 missing digits is 1 << 252
        let value = decode_to_integer("1", DigitPolicy::Lenient).unwrap();
        assert_eq!(value, BigUint::from(1u32) << 252usize);
    }

    #[test]
    fn test_encode_zero() {
        assert_eq!(encode(&BigUint::zero()), zeros(64));
    }

    #[test]
    fn test_encode_pads_left() {
        let field = encode(&BigUint::from(0xabcu32));
        assert_eq!(field.len(), 64);
        assert!(field.ends_with("abc"));
        assert!(field[..61].chars().all(|c| c == '0'));
    }

    #[test]
    fn test_encode_overflow_is_wider() {
        let big = BigUint::from(1u32) << 256usize;
        let field = encode(&big);
        assert_eq!(field.len(), 65);
        assert!(field.starts_with('1'));
    }

    #[test]
    fn test_encode_checked_rejects_overflow() {
        let big = BigUint::from(1u32) << 256usize;
        match encode_checked(&big) {
            Err(TallyError::FieldOverflow { width, digits }) => {
                assert_eq!(width, 64);
                assert_eq!(digits, 65);
            }
            other => panic!("expected FieldOverflow, got {:?}", other),
        }

        let max = (BigUint::from(1u32) << 256usize) - 1u32;
        assert_eq!(encode_checked(&max).unwrap(), "f".repeat(64));
    }

    #[test]
    fn test_records_round_trip() {
        let stream = format!(
            "{}{}{}",
            zeros(64),
            format!("{}2a", zeros(62)),
            format!("7{}", "e".repeat(63))
        );
        let records = decode(stream.as_bytes(), RecordEncoding::Text);
        assert_eq!(records.len(), 3);

        for record in &records {
            let value = decode_to_integer(record.as_str(), DigitPolicy::Strict).unwrap();
            assert_eq!(&encode(&value), record.as_str());
        }
    }

    #[test]
    fn test_uppercase_record_reencodes_lowercase() {
        let record = format!("{}AB", zeros(62));
        let value = decode_to_integer(&record, DigitPolicy::Strict).unwrap();
        assert_eq!(encode(&value), format!("{}ab", zeros(62)));
        assert_eq!(encode(&value), record.to_lowercase());
    }

    #[test]
    fn test_integer_round_trip() {
        for n in [0u64, 1, 10, 3, 0xdead_beef, u64::MAX] {
            let value = BigUint::from(n);
            let back = decode_to_integer(&encode(&value), DigitPolicy::Strict).unwrap();
            assert_eq!(back, value);
        }
    }

    #[test]
    fn test_encode_field_text_and_binary() {
        let value = BigUint::from(3u32);

        let text = encode_field(&value, RecordEncoding::Text).unwrap();
        assert_eq!(text, format!("{}3", zeros(63)).into_bytes());

        let binary = encode_field(&value, RecordEncoding::Binary).unwrap();
        assert_eq!(binary.len(), 32);
        assert_eq!(binary[31], 3);
        assert!(binary[..31].iter().all(|&b| b == 0));

        let zero = encode_field(&BigUint::zero(), RecordEncoding::Binary).unwrap();
        assert_eq!(zero, vec![0u8; 32]);
    }
}
