//! BER identifier and length octets (Tag, Length)

use bytes::BufMut;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ber::config::BerConfig;
use crate::error::{BerError, BerResult};

/// BER Tag Class
///
/// ASN.1 defines four tag classes. The same tag number under different
/// classes is unrelated: tag 1 in Universal class is BOOLEAN, tag 1 in
/// Context-specific class is whatever the enclosing type says it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TagClass {
    /// Universal class (00)
    Universal = 0,
    /// Application class (01)
    Application = 1,
    /// Context-specific class (10)
    ContextSpecific = 2,
    /// Private class (11)
    Private = 3,
}

impl TagClass {
    /// Get tag class from bits 8-7 of an identifier octet
    pub fn from_bits(byte: u8) -> Self {
        match byte >> 6 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }

    /// Convert tag class to bits 8-7 of an identifier octet
    pub fn to_bits(self) -> u8 {
        (self as u8) << 6
    }
}

/// BER Tag: class and number
///
/// The primitive/constructed bit is not part of the tag; it belongs to the
/// encoding of a particular value and lives on [`BerNode`](super::BerNode).
///
/// # Encoding Format
///
/// Low form (tag number 0-30):
/// ```text
/// Bits: 8 7 6 5 4 3 2 1
///       C C P T T T T T
/// ```
///
/// High form (tag number > 30):
/// ```text
/// First octet:     C C P 1 1 1 1 1
/// Following octets: 1 T T T T T T T ... 0 T T T T T T T
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    class: TagClass,
    number: u32,
}

impl Tag {
    pub const BOOLEAN: Tag = Tag::universal(1);
    pub const INTEGER: Tag = Tag::universal(2);
    pub const BIT_STRING: Tag = Tag::universal(3);
    pub const OCTET_STRING: Tag = Tag::universal(4);
    pub const NULL: Tag = Tag::universal(5);
    pub const OBJECT_IDENTIFIER: Tag = Tag::universal(6);
    pub const OBJECT_DESCRIPTOR: Tag = Tag::universal(7);
    pub const EXTERNAL: Tag = Tag::universal(8);
    pub const SEQUENCE: Tag = Tag::universal(16);
    pub const SET: Tag = Tag::universal(17);
    pub const GENERALIZED_TIME: Tag = Tag::universal(24);
    pub const VISIBLE_STRING: Tag = Tag::universal(26);
    pub const GENERAL_STRING: Tag = Tag::universal(27);

    /// Create a new BER tag
    ///
    /// # Arguments
    /// * `class` - Tag class
    /// * `number` - Tag number, any `u32`; numbers above 30 use the high form
    pub const fn new(class: TagClass, number: u32) -> Self {
        Self { class, number }
    }

    /// Universal class tag, e.g. `Tag::universal(16)` is SEQUENCE
    pub const fn universal(number: u32) -> Self {
        Self::new(TagClass::Universal, number)
    }

    /// Application class tag
    pub const fn application(number: u32) -> Self {
        Self::new(TagClass::Application, number)
    }

    /// Context-specific tag, the `[n]` of a schema field
    pub const fn context(number: u32) -> Self {
        Self::new(TagClass::ContextSpecific, number)
    }

    /// Private class tag
    pub const fn private(number: u32) -> Self {
        Self::new(TagClass::Private, number)
    }

    /// Get tag class
    pub fn class(&self) -> TagClass {
        self.class
    }

    /// Get tag number
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Number of identifier octets this tag occupies
    pub fn encoded_len(&self) -> usize {
        if self.number <= 30 {
            1
        } else {
            1 + base128_len(self.number)
        }
    }

    /// Encode identifier octets, always in the minimal form
    pub fn encode(&self, constructed: bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode_into(constructed, &mut out);
        out
    }

    /// Append identifier octets to `buf`
    pub fn encode_into<B: BufMut>(&self, constructed: bool, buf: &mut B) {
        let leading = self.class.to_bits() | if constructed { 0x20 } else { 0x00 };

        if self.number <= 30 {
            buf.put_u8(leading | self.number as u8);
        } else {
            buf.put_u8(leading | 0x1F);
            put_base128(self.number, buf);
        }
    }

    /// Decode identifier octets
    ///
    /// # Returns
    /// `(tag, constructed, bytes_consumed)`
    ///
    /// # Errors
    /// - `BufferExhausted` if the input ends inside the identifier
    /// - `MalformedTag` if the high form runs past `config.max_tag_octets`
    ///   continuation octets, overflows `u32`, or starts with a redundant
    ///   `0x80` octet
    pub fn decode(data: &[u8], config: &BerConfig) -> BerResult<(Self, bool, usize)> {
        let first = *data.first().ok_or(BerError::BufferExhausted {
            needed: 1,
            available: 0,
        })?;
        let class = TagClass::from_bits(first);
        let constructed = first & 0x20 != 0;

        if first & 0x1F != 0x1F {
            return Ok((Self::new(class, (first & 0x1F) as u32), constructed, 1));
        }

        let mut number: u32 = 0;
        let mut pos = 1;
        loop {
            if pos > config.max_tag_octets {
                return Err(BerError::MalformedTag(format!(
                    "high-form tag number does not terminate within {} octets",
                    config.max_tag_octets
                )));
            }
            let byte = *data.get(pos).ok_or(BerError::BufferExhausted {
                needed: pos + 1,
                available: data.len(),
            })?;
            if pos == 1 && byte == 0x80 {
                return Err(BerError::MalformedTag(
                    "high-form tag number has a redundant leading octet".to_string(),
                ));
            }
            if number > (u32::MAX >> 7) {
                return Err(BerError::MalformedTag("tag number overflows u32".to_string()));
            }
            number = (number << 7) | (byte & 0x7F) as u32;
            pos += 1;

            if byte & 0x80 == 0 {
                return Ok((Self::new(class, number), constructed, pos));
            }
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class {
            TagClass::Universal => write!(f, "[UNIVERSAL {}]", self.number),
            TagClass::Application => write!(f, "[APPLICATION {}]", self.number),
            TagClass::ContextSpecific => write!(f, "[{}]", self.number),
            TagClass::Private => write!(f, "[PRIVATE {}]", self.number),
        }
    }
}

/// Number of octets `value` needs in base-128 with continuation bits
pub(crate) fn base128_len(value: u32) -> usize {
    let bits = 32 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Append `value` in base-128, most significant group first, bit 8 set on
/// every octet but the last. Shared by high-form tags and OID subidentifiers.
pub(crate) fn put_base128<B: BufMut>(value: u32, buf: &mut B) {
    let len = base128_len(value);
    for i in (0..len).rev() {
        let group = ((value >> (i * 7)) & 0x7F) as u8;
        buf.put_u8(if i == 0 { group } else { group | 0x80 });
    }
}

/// Number of octets the definite length `length` occupies
pub fn length_encoded_len(length: usize) -> usize {
    if length < 0x80 {
        1
    } else {
        let bytes = (usize::BITS - length.leading_zeros()).div_ceil(8) as usize;
        1 + bytes
    }
}

/// Encode a definite length in the minimal form
///
/// - 0-127: short form, one octet
/// - otherwise: `0x80 | n` followed by `n` big-endian octets
pub fn encode_length(length: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(length_encoded_len(length));
    encode_length_into(length, &mut out);
    out
}

/// Append length octets to `buf`
pub fn encode_length_into<B: BufMut>(length: usize, buf: &mut B) {
    if length < 0x80 {
        buf.put_u8(length as u8);
    } else {
        let count = length_encoded_len(length) - 1;
        buf.put_u8(0x80 | count as u8);
        for i in (0..count).rev() {
            buf.put_u8((length >> (i * 8)) as u8);
        }
    }
}

/// Decode length octets
///
/// # Returns
/// `(length, bytes_consumed)`
///
/// # Errors
/// - `MalformedLength` for the indefinite form `0x80` (not supported:
///   framing is definite-length only), the reserved octet `0xFF`, or more
///   than `config.max_length_octets` length octets
/// - `BufferExhausted` if the input ends inside the length octets
///
/// Whether the decoded length fits the remaining input is checked by the
/// caller, which knows the enclosing region.
pub fn decode_length(data: &[u8], config: &BerConfig) -> BerResult<(usize, usize)> {
    let first = *data.first().ok_or(BerError::BufferExhausted {
        needed: 1,
        available: 0,
    })?;

    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }

    let count = (first & 0x7F) as usize;
    if count == 0 {
        return Err(BerError::MalformedLength(
            "indefinite length encoding not supported".to_string(),
        ));
    }
    if first == 0xFF {
        return Err(BerError::MalformedLength("reserved length octet 0xFF".to_string()));
    }
    let limit = config.max_length_octets.min(std::mem::size_of::<usize>());
    if count > limit {
        return Err(BerError::MalformedLength(format!(
            "long form uses {} length octets (max {})",
            count, limit
        )));
    }
    if data.len() < 1 + count {
        return Err(BerError::BufferExhausted {
            needed: 1 + count,
            available: data.len(),
        });
    }

    let length = data[1..=count]
        .iter()
        .fold(0usize, |acc, &byte| (acc << 8) | byte as usize);

    Ok((length, 1 + count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_low_form() {
        assert_eq!(Tag::INTEGER.encode(false), vec![0x02]);
        assert_eq!(Tag::SEQUENCE.encode(true), vec![0x30]);
        assert_eq!(Tag::application(0).encode(true), vec![0x60]);
        assert_eq!(Tag::context(30).encode(false), vec![0x9E]);
    }

    #[test]
    fn test_tag_high_form() {
        assert_eq!(Tag::context(31).encode(false), vec![0x9F, 0x1F]);
        assert_eq!(Tag::context(201).encode(true), vec![0xBF, 0x81, 0x49]);
        assert_eq!(Tag::context(211).encode(false), vec![0x9F, 0x81, 0x53]);
        assert_eq!(Tag::context(201).encoded_len(), 3);
    }

    #[test]
    fn test_tag_decode() {
        let config = BerConfig::default();
        let (tag, constructed, consumed) = Tag::decode(&[0x02], &config).unwrap();
        assert_eq!((tag, constructed, consumed), (Tag::INTEGER, false, 1));

        let (tag, constructed, consumed) = Tag::decode(&[0xBF, 0x81, 0x49, 0x00], &config).unwrap();
        assert_eq!(tag, Tag::context(201));
        assert!(constructed);
        assert_eq!(consumed, 3);

        let (tag, _, _) = Tag::decode(&[0xE5], &config).unwrap();
        assert_eq!(tag.class(), TagClass::Private);
        assert_eq!(tag.number(), 5);
    }

    #[test]
    fn test_tag_decode_errors() {
        let config = BerConfig::default();
        assert!(matches!(
            Tag::decode(&[], &config),
            Err(BerError::BufferExhausted { .. })
        ));
        assert!(matches!(
            Tag::decode(&[0x9F, 0x81], &config),
            Err(BerError::BufferExhausted { .. })
        ));
        assert!(matches!(
            Tag::decode(&[0x9F, 0x80, 0x01], &config),
            Err(BerError::MalformedTag(_))
        ));
        let endless = [0x9F, 0x81, 0x81, 0x81, 0x81, 0x81, 0x81, 0x01];
        assert!(matches!(
            Tag::decode(&endless, &config),
            Err(BerError::MalformedTag(_))
        ));
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(Tag::SEQUENCE.to_string(), "[UNIVERSAL 16]");
        assert_eq!(Tag::context(2).to_string(), "[2]");
        assert_eq!(Tag::application(1).to_string(), "[APPLICATION 1]");
    }

    #[test]
    fn test_length_short_and_long() {
        assert_eq!(encode_length(0), vec![0x00]);
        assert_eq!(encode_length(127), vec![0x7F]);
        assert_eq!(encode_length(128), vec![0x81, 0x80]);
        assert_eq!(encode_length(1000), vec![0x82, 0x03, 0xE8]);
        assert_eq!(length_encoded_len(1000), 3);
    }

    #[test]
    fn test_length_decode() {
        let config = BerConfig::default();
        assert_eq!(decode_length(&[100], &config).unwrap(), (100, 1));
        assert_eq!(decode_length(&[0x82, 0x03, 0xE8], &config).unwrap(), (1000, 3));
        // Non-minimal long form is legal BER
        assert_eq!(decode_length(&[0x81, 0x05], &config).unwrap(), (5, 2));
    }

    #[test]
    fn test_length_decode_errors() {
        let config = BerConfig::default();
        assert!(matches!(
            decode_length(&[0x80], &config),
            Err(BerError::MalformedLength(_))
        ));
        assert!(matches!(
            decode_length(&[0xFF], &config),
            Err(BerError::MalformedLength(_))
        ));
        assert!(matches!(
            decode_length(&[0x85, 1, 2, 3, 4, 5], &config),
            Err(BerError::MalformedLength(_))
        ));
        assert!(matches!(
            decode_length(&[0x82, 0x01], &config),
            Err(BerError::BufferExhausted { needed: 3, available: 2 })
        ));
    }
}
