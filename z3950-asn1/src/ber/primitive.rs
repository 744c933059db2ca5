//! Primitive value codec: content octets of leaf types
//!
//! | Rust type            | ASN.1 type          | universal tag |
//! |----------------------|---------------------|---------------|
//! | `bool`               | BOOLEAN             | 1             |
//! | `i64`                | INTEGER             | 2             |
//! | [`BitString`]        | BIT STRING          | 3             |
//! | [`OctetString`]      | OCTET STRING        | 4             |
//! | [`Null`]             | NULL                | 5             |
//! | [`ObjectIdentifier`] | OBJECT IDENTIFIER   | 6             |
//! | [`ObjectDescriptor`] | ObjectDescriptor    | 7             |
//! | [`GeneralizedTime`]  | GeneralizedTime     | 24            |
//! | [`VisibleString`]    | VisibleString       | 26            |
//! | [`InternationalString`] | GeneralString    | 27            |
//!
//! Only primitive encodings are accepted; a constructed string encoding is
//! rejected with `ExpectedPrimitive`.

use bytes::Bytes;
use std::fmt;
use z3950_core::{BitString, GeneralizedTime, ObjectIdentifier};

use crate::ber::composite::{BerDecode, BerEncode};
use crate::ber::config::{BerConfig, IntegerPolicy};
use crate::ber::node::BerNode;
use crate::ber::types::{Tag, put_base128};
use crate::error::{BerError, BerResult};

/// A leaf type with a universal tag and a content-octet codec
pub trait Primitive: Sized {
    const TAG: Tag;
    /// Type name used in error messages
    const KIND: &'static str;

    fn to_content(&self) -> Bytes;

    fn from_content(content: &[u8], config: &BerConfig) -> BerResult<Self>;
}

/// Implements [`BerDecode`] and [`BerEncode`] for a [`Primitive`]
macro_rules! primitive_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BerDecode for $ty {
                fn natural_tag() -> Option<Tag> {
                    Some(<$ty as Primitive>::TAG)
                }

                fn decode(node: &BerNode, check_tag: bool, config: &BerConfig) -> BerResult<Self> {
                    if check_tag {
                        node.expect_tag(<$ty as Primitive>::KIND, <$ty as Primitive>::TAG)?;
                    }
                    <$ty as Primitive>::from_content(node.raw_content()?, config)
                }
            }

            impl BerEncode for $ty {
                fn encode(&self) -> BerResult<BerNode> {
                    Ok(BerNode::primitive(<$ty as Primitive>::TAG, self.to_content()))
                }
            }
        )*
    };
}

/// Byte-string types whose character set is fixed by the schema, not the codec
macro_rules! string_type {
    ($(#[$meta:meta])* $name:ident, $tag:expr, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
        pub struct $name(Bytes);

        impl $name {
            pub fn new(bytes: impl Into<Bytes>) -> Self {
                Self(bytes.into())
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// The content as UTF-8, if it is valid UTF-8
            pub fn to_str(&self) -> Option<&str> {
                std::str::from_utf8(&self.0).ok()
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(Bytes::copy_from_slice(s.as_bytes()))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(Bytes::from(s))
            }
        }

        impl From<Vec<u8>> for $name {
            fn from(bytes: Vec<u8>) -> Self {
                Self(Bytes::from(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&String::from_utf8_lossy(&self.0))
            }
        }

        impl Primitive for $name {
            const TAG: Tag = $tag;
            const KIND: &'static str = $kind;

            fn to_content(&self) -> Bytes {
                self.0.clone()
            }

            fn from_content(content: &[u8], _config: &BerConfig) -> BerResult<Self> {
                Ok(Self(Bytes::copy_from_slice(content)))
            }
        }

        primitive_value!($name);
    };
}

string_type!(
    /// OCTET STRING
    OctetString,
    Tag::OCTET_STRING,
    "OCTET STRING"
);

string_type!(
    /// Z39.50 InternationalString, defined as GeneralString
    InternationalString,
    Tag::GENERAL_STRING,
    "InternationalString"
);

string_type!(
    /// VisibleString
    VisibleString,
    Tag::VISIBLE_STRING,
    "VisibleString"
);

string_type!(
    /// ObjectDescriptor
    ObjectDescriptor,
    Tag::OBJECT_DESCRIPTOR,
    "ObjectDescriptor"
);

/// NULL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Null;

impl Primitive for Null {
    const TAG: Tag = Tag::NULL;
    const KIND: &'static str = "NULL";

    fn to_content(&self) -> Bytes {
        Bytes::new()
    }

    fn from_content(content: &[u8], _config: &BerConfig) -> BerResult<Self> {
        if !content.is_empty() {
            return Err(BerError::malformed_value(
                Self::KIND,
                format!("content must be empty, got {} bytes", content.len()),
            ));
        }
        Ok(Null)
    }
}

impl Primitive for bool {
    const TAG: Tag = Tag::BOOLEAN;
    const KIND: &'static str = "BOOLEAN";

    fn to_content(&self) -> Bytes {
        Bytes::from_static(if *self { &[0xFF] } else { &[0x00] })
    }

    /// Any nonzero octet is true
    fn from_content(content: &[u8], _config: &BerConfig) -> BerResult<Self> {
        match content {
            [byte] => Ok(*byte != 0),
            _ => Err(BerError::malformed_value(
                Self::KIND,
                format!("content must be 1 byte, got {}", content.len()),
            )),
        }
    }
}

impl Primitive for i64 {
    const TAG: Tag = Tag::INTEGER;
    const KIND: &'static str = "INTEGER";

    fn to_content(&self) -> Bytes {
        Bytes::from(encode_integer(*self))
    }

    fn from_content(content: &[u8], config: &BerConfig) -> BerResult<Self> {
        decode_integer(content, config.integer_policy)
    }
}

impl Primitive for ObjectIdentifier {
    const TAG: Tag = Tag::OBJECT_IDENTIFIER;
    const KIND: &'static str = "OBJECT IDENTIFIER";

    fn to_content(&self) -> Bytes {
        Bytes::from(encode_object_identifier(self))
    }

    fn from_content(content: &[u8], _config: &BerConfig) -> BerResult<Self> {
        decode_object_identifier(content)
    }
}

impl Primitive for BitString {
    const TAG: Tag = Tag::BIT_STRING;
    const KIND: &'static str = "BIT STRING";

    fn to_content(&self) -> Bytes {
        let mut content = Vec::with_capacity(1 + self.as_bytes().len());
        content.push(self.unused_bits());
        content.extend_from_slice(self.as_bytes());
        Bytes::from(content)
    }

    fn from_content(content: &[u8], _config: &BerConfig) -> BerResult<Self> {
        let (&unused, bits) = content
            .split_first()
            .ok_or_else(|| BerError::malformed_value(Self::KIND, "missing unused-bits octet"))?;
        if unused > 7 {
            return Err(BerError::malformed_value(
                Self::KIND,
                format!("unused bits {} (must be 0-7)", unused),
            ));
        }
        if bits.is_empty() && unused != 0 {
            return Err(BerError::malformed_value(
                Self::KIND,
                "empty bit string with nonzero unused bits",
            ));
        }
        Ok(BitString::new(bits.to_vec(), bits.len() * 8 - unused as usize)?)
    }
}

impl Primitive for GeneralizedTime {
    const TAG: Tag = Tag::GENERALIZED_TIME;
    const KIND: &'static str = "GeneralizedTime";

    fn to_content(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_str().as_bytes())
    }

    fn from_content(content: &[u8], _config: &BerConfig) -> BerResult<Self> {
        let text = std::str::from_utf8(content)
            .ok()
            .filter(|text| text.is_ascii())
            .ok_or_else(|| BerError::malformed_value(Self::KIND, "content is not ASCII"))?;
        Ok(GeneralizedTime::parse(text)?)
    }
}

primitive_value!(Null, bool, i64, ObjectIdentifier, BitString, GeneralizedTime);

/// Minimal big-endian two's complement content octets of `value`
pub fn encode_integer(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    // Drop a leading octet while the next one carries the same sign
    let mut start = 0;
    while start < bytes.len() - 1 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}

/// Decode two's complement content octets under `policy`
///
/// # Errors
/// `MalformedValue` for empty content, redundant leading octets under
/// `IntegerPolicy::Strict`, or a value that does not fit `i64`.
pub fn decode_integer(content: &[u8], policy: IntegerPolicy) -> BerResult<i64> {
    if content.is_empty() {
        return Err(BerError::malformed_value("INTEGER", "empty content"));
    }

    let mut significant = content;
    while significant.len() > 1 {
        let redundant = (significant[0] == 0x00 && significant[1] & 0x80 == 0)
            || (significant[0] == 0xFF && significant[1] & 0x80 != 0);
        if !redundant {
            break;
        }
        significant = &significant[1..];
    }

    if significant.len() != content.len() {
        match policy {
            IntegerPolicy::Strict => {
                return Err(BerError::malformed_value(
                    "INTEGER",
                    format!(
                        "non-minimal encoding: {} redundant leading octets",
                        content.len() - significant.len()
                    ),
                ));
            }
            IntegerPolicy::Lenient => {
                log::warn!(
                    "normalising non-minimal INTEGER encoding of {} octets",
                    content.len()
                );
            }
        }
    }

    if significant.len() > 8 {
        return Err(BerError::malformed_value(
            "INTEGER",
            format!("{} significant octets do not fit i64", significant.len()),
        ));
    }

    let fill = if significant[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut bytes = [fill; 8];
    bytes[8 - significant.len()..].copy_from_slice(significant);
    Ok(i64::from_be_bytes(bytes))
}

/// Content octets of an OBJECT IDENTIFIER
///
/// The first subidentifier is `first * 40 + second`; every subidentifier is
/// written base-128, the same shape as a high-form tag number.
pub fn encode_object_identifier(oid: &ObjectIdentifier) -> Vec<u8> {
    let mut content = Vec::new();
    put_base128(oid.first_subidentifier(), &mut content);
    for &arc in &oid.arcs()[2..] {
        put_base128(arc, &mut content);
    }
    content
}

/// Decode OBJECT IDENTIFIER content octets
///
/// # Errors
/// `MalformedValue` for empty content, a subidentifier with a redundant
/// leading `0x80` octet, a truncated final subidentifier, or an arc that
/// overflows `u32`.
pub fn decode_object_identifier(content: &[u8]) -> BerResult<ObjectIdentifier> {
    const KIND: &str = "OBJECT IDENTIFIER";

    if content.is_empty() {
        return Err(BerError::malformed_value(KIND, "empty content"));
    }

    let mut subidentifiers = Vec::new();
    let mut value: u32 = 0;
    let mut in_progress = false;
    for &byte in content {
        if !in_progress && byte == 0x80 {
            return Err(BerError::malformed_value(
                KIND,
                "subidentifier with redundant leading octet",
            ));
        }
        if value > (u32::MAX >> 7) {
            return Err(BerError::malformed_value(KIND, "arc overflows u32"));
        }
        value = (value << 7) | (byte & 0x7F) as u32;
        in_progress = byte & 0x80 != 0;
        if !in_progress {
            subidentifiers.push(value);
            value = 0;
        }
    }
    if in_progress {
        return Err(BerError::malformed_value(KIND, "truncated final subidentifier"));
    }

    let first = subidentifiers[0];
    let (arc0, arc1) = match first {
        0..=39 => (0, first),
        40..=79 => (1, first - 40),
        _ => (2, first - 80),
    };
    let mut arcs = Vec::with_capacity(subidentifiers.len() + 1);
    arcs.push(arc0);
    arcs.push(arc1);
    arcs.extend_from_slice(&subidentifiers[1..]);

    Ok(ObjectIdentifier::new(arcs)?)
}
