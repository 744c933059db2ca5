//! Composite decode/encode contract and the generic field engine
//!
//! Schema types describe their fields declaratively as [`Field`] constants
//! and implement [`Sequence`] by calling one [`FieldReader`] / [`FieldWriter`]
//! method per field, in schema order. The reader method selects presence:
//!
//! | method                 | Rust type         | absent when                          |
//! |------------------------|-------------------|--------------------------------------|
//! | `mandatory`            | `T`               | never (`Incomplete` / `UnexpectedTag`) |
//! | `optional` (tagged)    | `Option<T>`       | next child has another tag           |
//! | `optional` (untagged)  | `Option<T>`       | speculative decode of next child fails |
//! | `repeated`             | `Option<Vec<T>>`  | no wrapper node                      |
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use z3950_asn1::ber::{Field, FieldReader, FieldWriter, Sequence};
//! use z3950_asn1::error::BerResult;
//!
//! struct Ping {
//!     id: i64,
//!     note: Option<bool>,
//! }
//!
//! impl Ping {
//!     const ID: Field = Field::implicit("id", 0);
//!     const NOTE: Field = Field::implicit("note", 1);
//! }
//!
//! impl Sequence for Ping {
//!     const NAME: &'static str = "Ping";
//!
//!     fn read_fields(reader: &mut FieldReader<'_>) -> BerResult<Self> {
//!         Ok(Self {
//!             id: reader.mandatory(Self::ID)?,
//!             note: reader.optional(Self::NOTE)?,
//!         })
//!     }
//!
//!     fn write_fields(&self, writer: &mut FieldWriter) -> BerResult<()> {
//!         writer.mandatory(Self::ID, &self.id)?;
//!         writer.optional(Self::NOTE, self.note.as_ref())?;
//!         Ok(())
//!     }
//! }
//!
//! z3950_asn1::sequence_value!(Ping);
//! ```

use crate::ber::config::BerConfig;
use crate::ber::decoder::BerDecoder;
use crate::ber::node::BerNode;
use crate::ber::types::Tag;
use crate::error::{BerError, BerResult};

/// Decode half of the composite contract
pub trait BerDecode: Sized {
    /// The tag this type carries when it stands alone
    ///
    /// `None` for CHOICE and open types, whose tag depends on the value.
    fn natural_tag() -> Option<Tag>;

    /// Decode from a parsed node
    ///
    /// With `check_tag` false the caller has already matched an IMPLICIT
    /// outer tag, so the node's tag is not compared against the natural tag.
    fn decode(node: &BerNode, check_tag: bool, config: &BerConfig) -> BerResult<Self>;
}

/// Encode half of the composite contract
pub trait BerEncode {
    /// Whether an IMPLICIT outer tag may replace the encoded tag
    ///
    /// False for CHOICE and open types: their own tag is what identifies
    /// the value, so they can only be tagged EXPLICIT.
    const IMPLICIT_TAGGABLE: bool = true;

    /// Encode under the type's own tag
    fn encode(&self) -> BerResult<BerNode>;

    /// Encode under a caller-supplied tagging
    ///
    /// # Errors
    /// `MalformedTag` for `Tagging::Implicit` on a type that is not
    /// [`IMPLICIT_TAGGABLE`](Self::IMPLICIT_TAGGABLE), plus whatever
    /// [`encode`](Self::encode) returns.
    fn encode_tagged(&self, tagging: Tagging) -> BerResult<BerNode> {
        if let Tagging::Implicit(tag) = tagging {
            if !Self::IMPLICIT_TAGGABLE {
                return Err(BerError::MalformedTag(format!(
                    "IMPLICIT {} would erase the tag that selects a CHOICE or open type",
                    tag
                )));
            }
        }
        let node = self.encode()?;
        Ok(match tagging {
            Tagging::Untagged => node,
            Tagging::Implicit(tag) => node.with_tag(tag),
            Tagging::Explicit(tag) => node.explicit(tag),
        })
    }
}

/// How a field's tag relates to its type's natural tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tagging {
    /// The value's own tag is used on the wire
    Untagged,
    /// The value's own tag is replaced in place
    Implicit(Tag),
    /// The value's own encoding is wrapped in one constructed layer
    Explicit(Tag),
}

impl Tagging {
    /// Outer tag, if any
    pub const fn tag(&self) -> Option<Tag> {
        match self {
            Tagging::Untagged => None,
            Tagging::Implicit(tag) | Tagging::Explicit(tag) => Some(*tag),
        }
    }
}

/// Declarative descriptor of one schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Schema name of the field, reported in errors
    pub name: &'static str,
    pub tagging: Tagging,
}

impl Field {
    /// Create a field descriptor
    ///
    /// # Arguments
    /// * `name` - Schema name, used in `Incomplete` / `UnexpectedTag` errors
    /// * `tagging` - How the field's tag relates to its type's natural tag
    pub const fn new(name: &'static str, tagging: Tagging) -> Self {
        Self { name, tagging }
    }

    /// `[number] IMPLICIT`, context-specific class
    pub const fn implicit(name: &'static str, number: u32) -> Self {
        Self::new(name, Tagging::Implicit(Tag::context(number)))
    }

    /// `[number] EXPLICIT`, context-specific class
    pub const fn explicit(name: &'static str, number: u32) -> Self {
        Self::new(name, Tagging::Explicit(Tag::context(number)))
    }

    /// Field carried under its type's own tag
    ///
    /// An untagged optional field is decoded speculatively by
    /// [`FieldReader::optional`].
    pub const fn untagged(name: &'static str) -> Self {
        Self::new(name, Tagging::Untagged)
    }
}

/// A SEQUENCE-shaped schema type driven by the field engine
///
/// Implement this and invoke [`sequence_value!`](crate::sequence_value) to
/// get [`BerDecode`] and [`BerEncode`].
pub trait Sequence: Sized {
    /// Type name used in error messages
    const NAME: &'static str;

    /// Natural tag, universal SEQUENCE unless the schema says otherwise
    const TAG: Tag = Tag::SEQUENCE;

    /// Read every field in schema order
    fn read_fields(reader: &mut FieldReader<'_>) -> BerResult<Self>;

    /// Write every present field in schema order
    fn write_fields(&self, writer: &mut FieldWriter) -> BerResult<()>;
}

/// Implements [`BerDecode`] and [`BerEncode`] for [`Sequence`] types
#[macro_export]
macro_rules! sequence_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::ber::BerDecode for $ty {
                fn natural_tag() -> ::core::option::Option<$crate::ber::Tag> {
                    ::core::option::Option::Some(<$ty as $crate::ber::Sequence>::TAG)
                }

                fn decode(
                    node: &$crate::ber::BerNode,
                    check_tag: bool,
                    config: &$crate::ber::BerConfig,
                ) -> $crate::error::BerResult<Self> {
                    $crate::ber::decode_fields::<$ty>(node, check_tag, config)
                }
            }

            impl $crate::ber::BerEncode for $ty {
                fn encode(&self) -> $crate::error::BerResult<$crate::ber::BerNode> {
                    $crate::ber::encode_fields(self)
                }
            }
        )*
    };
}

/// Saved cursor position of a [`FieldReader`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Cursor over the children of a constructed node
pub struct FieldReader<'a> {
    context: &'static str,
    children: &'a [BerNode],
    cursor: usize,
    config: &'a BerConfig,
}

impl<'a> FieldReader<'a> {
    /// Create a reader positioned at the first child
    ///
    /// # Arguments
    /// * `context` - Name of the enclosing type, reported by `finish`
    /// * `children` - Children of the constructed node being decoded
    /// * `config` - Limits and policies passed on to every field
    pub fn new(context: &'static str, children: &'a [BerNode], config: &'a BerConfig) -> Self {
        Self {
            context,
            children,
            cursor: 0,
            config,
        }
    }

    /// Get the decoder configuration
    pub fn config(&self) -> &'a BerConfig {
        self.config
    }

    /// Next unconsumed child
    pub fn peek(&self) -> Option<&'a BerNode> {
        self.children.get(self.cursor)
    }

    /// Number of unconsumed children
    pub fn remaining(&self) -> usize {
        self.children.len() - self.cursor
    }

    /// Save the cursor position
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.cursor)
    }

    /// Restore a position saved by [`checkpoint`](Self::checkpoint)
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.cursor = checkpoint.0;
    }

    fn advance(&mut self) {
        self.cursor += 1;
    }

    /// Decode a field that must be present
    ///
    /// # Errors
    /// `Incomplete` if no child remains, `UnexpectedTag` if a tagged field's
    /// tag does not match, or whatever the field type's decode returns.
    pub fn mandatory<T: BerDecode>(&mut self, field: Field) -> BerResult<T> {
        let node = self.peek().ok_or(BerError::Incomplete { field: field.name })?;
        if let Some(tag) = field.tagging.tag() {
            node.expect_tag(field.name, tag)?;
        }
        log::trace!("{}.{}: mandatory {}", self.context, field.name, node.tag());
        let value = decode_field(node, field, self.config)?;
        self.advance();
        Ok(value)
    }

    /// Decode a field that may be absent
    ///
    /// A tagged field is present iff the next child carries its tag; once
    /// matched, decode errors propagate. An untagged field is decoded
    /// speculatively: any failure rolls the cursor back and the field is
    /// absent, leaving the same child for the next field.
    pub fn optional<T: BerDecode>(&mut self, field: Field) -> BerResult<Option<T>> {
        let Some(node) = self.peek() else {
            return Ok(None);
        };

        if let Some(tag) = field.tagging.tag() {
            if node.tag() != tag {
                return Ok(None);
            }
            log::trace!("{}.{}: optional {}", self.context, field.name, tag);
            let value = decode_field(node, field, self.config)?;
            self.advance();
            return Ok(Some(value));
        }

        let checkpoint = self.checkpoint();
        self.advance();
        match decode_field(node, field, self.config) {
            Ok(value) => {
                log::trace!("{}.{}: speculative {}", self.context, field.name, node.tag());
                Ok(Some(value))
            }
            Err(err) => {
                self.rollback(checkpoint);
                log::debug!(
                    "{}.{}: absent, rolled back over {} ({})",
                    self.context,
                    field.name,
                    node.tag(),
                    err
                );
                Ok(None)
            }
        }
    }

    /// Decode a SEQUENCE OF field that may be absent
    ///
    /// The wrapper is recognised by the field's outer tag, or by the
    /// universal SEQUENCE tag when untagged. A present wrapper with no
    /// children yields `Some(vec![])`.
    pub fn repeated<T: BerDecode>(&mut self, field: Field) -> BerResult<Option<Vec<T>>> {
        let wrapper = field.tagging.tag().unwrap_or(Tag::SEQUENCE);
        match self.peek() {
            Some(node) if node.tag() == wrapper => {
                log::trace!("{}.{}: repeated {}", self.context, field.name, wrapper);
                let values = decode_field::<Vec<T>>(node, field, self.config)?;
                self.advance();
                Ok(Some(values))
            }
            _ => Ok(None),
        }
    }

    /// Decode a SEQUENCE OF field that must be present
    pub fn repeated_mandatory<T: BerDecode>(&mut self, field: Field) -> BerResult<Vec<T>> {
        match self.repeated(field)? {
            Some(values) => Ok(values),
            None => match self.peek() {
                None => Err(BerError::Incomplete { field: field.name }),
                Some(node) => Err(BerError::unexpected_tag(
                    field.name,
                    field.tagging.tag().unwrap_or(Tag::SEQUENCE),
                    node.tag(),
                )),
            },
        }
    }

    /// Require that every child has been consumed
    ///
    /// # Errors
    /// `TrailingData` with the number of unconsumed children.
    pub fn finish(&self) -> BerResult<()> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(BerError::TrailingData {
                context: self.context,
                remaining,
            }),
        }
    }
}

/// Decode `node` as the value of `field`; the outer tag is already matched
fn decode_field<T: BerDecode>(node: &BerNode, field: Field, config: &BerConfig) -> BerResult<T> {
    match field.tagging {
        Tagging::Untagged => T::decode(node, true, config),
        Tagging::Implicit(_) => T::decode(node, false, config),
        Tagging::Explicit(_) => T::decode(node.explicit_inner(field.name)?, true, config),
    }
}

/// Accumulates child nodes in schema order
#[derive(Debug, Default)]
pub struct FieldWriter {
    children: Vec<BerNode>,
}

impl FieldWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a field that is always present
    ///
    /// # Returns
    /// The writer, so calls can be chained in schema order
    pub fn mandatory<T: BerEncode + ?Sized>(&mut self, field: Field, value: &T) -> BerResult<&mut Self> {
        self.children.push(value.encode_tagged(field.tagging)?);
        Ok(self)
    }

    /// Emit the field only if present
    pub fn optional<T: BerEncode + ?Sized>(&mut self, field: Field, value: Option<&T>) -> BerResult<&mut Self> {
        if let Some(value) = value {
            self.mandatory(field, value)?;
        }
        Ok(self)
    }

    /// Emit a SEQUENCE OF wrapper only if present, even when empty
    pub fn repeated<T: BerEncode>(&mut self, field: Field, values: Option<&[T]>) -> BerResult<&mut Self> {
        if let Some(values) = values {
            self.repeated_mandatory(field, values)?;
        }
        Ok(self)
    }

    /// Emit a SEQUENCE OF wrapper that is always present
    pub fn repeated_mandatory<T: BerEncode>(&mut self, field: Field, values: &[T]) -> BerResult<&mut Self> {
        self.mandatory(field, values)
    }

    /// Wrap the accumulated children in a constructed node
    pub fn into_node(self, tag: Tag) -> BerNode {
        BerNode::constructed(tag, self.children)
    }
}

/// Decode a [`Sequence`]: tag check, constructed form, fields, no leftovers
pub fn decode_fields<T: Sequence>(node: &BerNode, check_tag: bool, config: &BerConfig) -> BerResult<T> {
    if check_tag {
        node.expect_tag(T::NAME, T::TAG)?;
    }
    let mut reader = FieldReader::new(T::NAME, node.children()?, config);
    let value = T::read_fields(&mut reader)?;
    reader.finish()?;
    Ok(value)
}

/// Encode a [`Sequence`] under its natural tag
pub fn encode_fields<T: Sequence>(value: &T) -> BerResult<BerNode> {
    let mut writer = FieldWriter::new();
    value.write_fields(&mut writer)?;
    Ok(writer.into_node(T::TAG))
}

/// Decode the children of a SEQUENCE OF node, one element each
pub fn decode_sequence_of<T: BerDecode>(node: &BerNode, config: &BerConfig) -> BerResult<Vec<T>> {
    node.children()?
        .iter()
        .map(|child| T::decode(child, true, config))
        .collect()
}

/// Encode elements as a universal SEQUENCE OF node
pub fn encode_sequence_of<T: BerEncode>(values: &[T]) -> BerResult<BerNode> {
    let children = values
        .iter()
        .map(BerEncode::encode)
        .collect::<BerResult<Vec<_>>>()?;
    Ok(BerNode::constructed(Tag::SEQUENCE, children))
}

impl<T: BerDecode> BerDecode for Vec<T> {
    fn natural_tag() -> Option<Tag> {
        Some(Tag::SEQUENCE)
    }

    fn decode(node: &BerNode, check_tag: bool, config: &BerConfig) -> BerResult<Self> {
        if check_tag {
            node.expect_tag("SEQUENCE OF", Tag::SEQUENCE)?;
        }
        decode_sequence_of(node, config)
    }
}

impl<T: BerEncode> BerEncode for [T] {
    fn encode(&self) -> BerResult<BerNode> {
        encode_sequence_of(self)
    }
}

impl<T: BerEncode> BerEncode for Vec<T> {
    fn encode(&self) -> BerResult<BerNode> {
        encode_sequence_of(self)
    }
}

/// Open type: the node is carried through verbatim
impl BerDecode for BerNode {
    fn natural_tag() -> Option<Tag> {
        None
    }

    fn decode(node: &BerNode, _check_tag: bool, _config: &BerConfig) -> BerResult<Self> {
        Ok(node.clone())
    }
}

impl BerEncode for BerNode {
    const IMPLICIT_TAGGABLE: bool = false;

    fn encode(&self) -> BerResult<BerNode> {
        Ok(self.clone())
    }
}

/// Decode exactly one value from `data`
///
/// # Errors
/// `BufferExhausted` if `data` exceeds `config.max_message_len`, any
/// framing or schema error, or `TrailingData` if bytes remain.
pub fn from_ber<T: BerDecode>(data: &[u8], config: &BerConfig) -> BerResult<T> {
    from_ber_tagged(data, Tagging::Untagged, config)
}

/// Decode exactly one value carried under `tagging`
pub fn from_ber_tagged<T: BerDecode>(data: &[u8], tagging: Tagging, config: &BerConfig) -> BerResult<T> {
    if data.len() > config.max_message_len {
        return Err(BerError::BufferExhausted {
            needed: data.len(),
            available: config.max_message_len,
        });
    }

    let mut decoder = BerDecoder::new(data, config);
    let (node, _) = decoder.parse_node()?;
    decoder.finish()?;

    let field = Field::new("value", tagging);
    if let Some(tag) = tagging.tag() {
        node.expect_tag(field.name, tag)?;
    }
    decode_field(&node, field, config)
}

/// Canonical BER encoding of `value` under its own tag
pub fn to_ber<T: BerEncode + ?Sized>(value: &T) -> BerResult<Vec<u8>> {
    Ok(value.encode()?.to_bytes())
}

/// Canonical BER encoding of `value` under `tagging`
pub fn to_ber_tagged<T: BerEncode + ?Sized>(value: &T, tagging: Tagging) -> BerResult<Vec<u8>> {
    Ok(value.encode_tagged(tagging)?.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::primitive::{OctetString, VisibleString};
    use bytes::Bytes;

    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    struct Sample {
        id: i64,
        flag: Option<bool>,
        note: Option<OctetString>,
        names: Option<Vec<VisibleString>>,
        wrapped: Option<i64>,
    }

    impl Sample {
        const ID: Field = Field::implicit("id", 0);
        const FLAG: Field = Field::implicit("flag", 1);
        const NOTE: Field = Field::untagged("note");
        const NAMES: Field = Field::implicit("names", 2);
        const WRAPPED: Field = Field::explicit("wrapped", 3);
    }

    impl Sequence for Sample {
        const NAME: &'static str = "Sample";

        fn read_fields(reader: &mut FieldReader<'_>) -> BerResult<Self> {
            Ok(Self {
                id: reader.mandatory(Self::ID)?,
                flag: reader.optional(Self::FLAG)?,
                note: reader.optional(Self::NOTE)?,
                names: reader.repeated(Self::NAMES)?,
                wrapped: reader.optional(Self::WRAPPED)?,
            })
        }

        fn write_fields(&self, writer: &mut FieldWriter) -> BerResult<()> {
            writer
                .mandatory(Self::ID, &self.id)?
                .optional(Self::FLAG, self.flag.as_ref())?
                .optional(Self::NOTE, self.note.as_ref())?
                .repeated(Self::NAMES, self.names.as_deref())?
                .optional(Self::WRAPPED, self.wrapped.as_ref())?;
            Ok(())
        }
    }

    crate::sequence_value!(Sample);

    fn config() -> BerConfig {
        BerConfig::default()
    }

    fn full() -> Sample {
        Sample {
            id: 300,
            flag: Some(true),
            note: Some(OctetString::from("hello")),
            names: Some(vec![VisibleString::from("a"), VisibleString::from("bc")]),
            wrapped: Some(-2),
        }
    }

    #[test]
    fn test_round_trip_full_and_minimal() {
        for value in [full(), Sample { id: 7, ..Default::default() }] {
            let bytes = to_ber(&value).unwrap();
            assert_eq!(from_ber::<Sample>(&bytes, &config()).unwrap(), value);
        }
    }

    #[test]
    fn test_minimal_encoding() {
        let value = Sample { id: 7, ..Default::default() };
        assert_eq!(to_ber(&value).unwrap(), vec![0x30, 0x03, 0x80, 0x01, 0x07]);
    }

    #[test]
    fn test_optional_absence_then_one_present() {
        let data = [0x30, 0x08, 0x80, 0x01, 0x07, 0xA3, 0x03, 0x02, 0x01, 0x05];
        let value = from_ber::<Sample>(&data, &config()).unwrap();
        assert_eq!(
            value,
            Sample {
                id: 7,
                wrapped: Some(5),
                ..Default::default()
            }
        );
        assert_eq!(to_ber(&value).unwrap(), data);
    }

    #[test]
    fn test_sequence_of_empty_versus_absent() {
        let empty = Sample {
            id: 7,
            names: Some(Vec::new()),
            ..Default::default()
        };
        let bytes = to_ber(&empty).unwrap();
        assert_eq!(bytes, vec![0x30, 0x05, 0x80, 0x01, 0x07, 0xA2, 0x00]);
        assert_eq!(from_ber::<Sample>(&bytes, &config()).unwrap().names, Some(Vec::new()));

        let absent = Sample { id: 7, ..Default::default() };
        let bytes = to_ber(&absent).unwrap();
        assert_eq!(from_ber::<Sample>(&bytes, &config()).unwrap().names, None);
    }

    #[test]
    fn test_speculative_field_rolls_back() {
        let children = [BerNode::primitive(Tag::context(2), Bytes::from_static(b"x"))];
        let config = config();
        let mut reader = FieldReader::new("test", &children, &config);

        let note: Option<OctetString> = reader.optional(Field::untagged("note")).unwrap();
        assert_eq!(note, None);
        assert_eq!(reader.remaining(), 1);

        // The same child is offered to the next field
        let tagged: Option<OctetString> = reader.optional(Field::implicit("tagged", 2)).unwrap();
        assert_eq!(tagged, Some(OctetString::from("x")));
        reader.finish().unwrap();
    }

    #[test]
    fn test_speculative_field_consumes_on_success() {
        let value = Sample {
            id: 1,
            note: Some(OctetString::from("n")),
            names: Some(vec![VisibleString::from("z")]),
            ..Default::default()
        };
        let bytes = to_ber(&value).unwrap();
        assert_eq!(from_ber::<Sample>(&bytes, &config()).unwrap(), value);
    }

    #[test]
    fn test_checkpoint_restores_cursor() {
        let children = [
            BerNode::primitive(Tag::NULL, Bytes::new()),
            BerNode::primitive(Tag::NULL, Bytes::new()),
        ];
        let config = config();
        let mut reader = FieldReader::new("test", &children, &config);
        let checkpoint = reader.checkpoint();
        let _: BerNode = reader.mandatory(Field::untagged("first")).unwrap();
        assert_eq!(reader.remaining(), 1);
        reader.rollback(checkpoint);
        assert_eq!(reader.remaining(), 2);
    }

    #[test]
    fn test_mandatory_missing() {
        assert_eq!(
            from_ber::<Sample>(&[0x30, 0x00], &config()).unwrap_err(),
            BerError::Incomplete { field: "id" }
        );
    }

    #[test]
    fn test_mandatory_wrong_tag() {
        let err = from_ber::<Sample>(&[0x30, 0x03, 0x81, 0x01, 0x07], &config()).unwrap_err();
        assert_eq!(err, BerError::unexpected_tag("id", Tag::context(0), Tag::context(1)));
    }

    #[test]
    fn test_unknown_trailing_child() {
        let data = [0x30, 0x06, 0x80, 0x01, 0x07, 0x89, 0x01, 0x00];
        assert_eq!(
            from_ber::<Sample>(&data, &config()).unwrap_err(),
            BerError::TrailingData {
                context: "Sample",
                remaining: 1
            }
        );
    }

    #[test]
    fn test_trailing_byte_after_message() {
        let mut bytes = to_ber(&full()).unwrap();
        bytes.push(0x00);
        assert_eq!(
            from_ber::<Sample>(&bytes, &config()).unwrap_err(),
            BerError::TrailingData {
                context: "message",
                remaining: 1
            }
        );
    }

    #[test]
    fn test_flipped_optional_tag_is_not_misparsed() {
        let mut bytes = to_ber(&full()).unwrap();
        // flag [1] follows id [0] of three content bytes (300 = 01 2C)
        assert_eq!(bytes[6], 0x81);
        bytes[6] = 0x84;
        assert!(matches!(
            from_ber::<Sample>(&bytes, &config()),
            Err(BerError::TrailingData { .. }) | Err(BerError::UnexpectedTag { .. })
        ));
    }

    #[test]
    fn test_present_tagged_field_errors_propagate() {
        // flag [1] with two content octets
        let data = [0x30, 0x07, 0x80, 0x01, 0x07, 0x81, 0x02, 0x00, 0x00];
        assert!(matches!(
            from_ber::<Sample>(&data, &config()),
            Err(BerError::MalformedValue { kind: "BOOLEAN", .. })
        ));
    }

    #[test]
    fn test_form_mismatch() {
        // SEQUENCE tag with primitive form
        assert_eq!(
            from_ber::<Sample>(&[0x10, 0x00], &config()).unwrap_err(),
            BerError::ExpectedConstructed { tag: Tag::SEQUENCE }
        );
        // SEQUENCE OF wrapper in primitive form
        let data = [0x30, 0x05, 0x80, 0x01, 0x07, 0x82, 0x00];
        assert_eq!(
            from_ber::<Sample>(&data, &config()).unwrap_err(),
            BerError::ExpectedConstructed { tag: Tag::context(2) }
        );
    }

    #[test]
    fn test_outer_tagging() {
        let value = full();
        let implicit = Tagging::Implicit(Tag::context(20));
        let bytes = to_ber_tagged(&value, implicit).unwrap();
        assert_eq!(bytes[0], 0xB4);
        assert_eq!(from_ber_tagged::<Sample>(&bytes, implicit, &config()).unwrap(), value);
        assert!(from_ber::<Sample>(&bytes, &config()).is_err());

        let explicit = Tagging::Explicit(Tag::application(1));
        let bytes = to_ber_tagged(&value, explicit).unwrap();
        assert_eq!(&bytes[..1], &[0x61]);
        assert_eq!(from_ber_tagged::<Sample>(&bytes, explicit, &config()).unwrap(), value);
    }

    #[test]
    fn test_repeated_mandatory() {
        let config = config();
        let children = [BerNode::constructed(Tag::SEQUENCE, Vec::new())];
        let mut reader = FieldReader::new("test", &children, &config);
        let values: Vec<i64> = reader.repeated_mandatory(Field::untagged("items")).unwrap();
        assert!(values.is_empty());

        let mut reader = FieldReader::new("test", &[], &config);
        assert_eq!(
            reader.repeated_mandatory::<i64>(Field::untagged("items")).unwrap_err(),
            BerError::Incomplete { field: "items" }
        );
    }

    #[test]
    fn test_open_type_passthrough() {
        let any = BerNode::constructed(
            Tag::private(9),
            vec![BerNode::primitive(Tag::context(0), Bytes::from_static(&[1, 2, 3]))],
        );
        let bytes = to_ber(&any).unwrap();
        assert_eq!(from_ber::<BerNode>(&bytes, &config()).unwrap(), any);
    }

    #[test]
    fn test_open_type_tagging() {
        let any = BerNode::primitive(Tag::INTEGER, vec![0x2Au8]);
        assert!(matches!(
            to_ber_tagged(&any, Tagging::Implicit(Tag::context(0))),
            Err(BerError::MalformedTag(_))
        ));

        let explicit = Tagging::Explicit(Tag::context(0));
        let bytes = to_ber_tagged(&any, explicit).unwrap();
        assert_eq!(bytes, vec![0xA0, 0x03, 0x02, 0x01, 0x2A]);
        assert_eq!(from_ber_tagged::<BerNode>(&bytes, explicit, &config()).unwrap(), any);
    }

    #[test]
    fn test_message_budget_checked_first() {
        let bytes = to_ber(&full()).unwrap();
        let config = BerConfig::default().with_max_message_len(bytes.len() - 1);
        assert!(matches!(
            from_ber::<Sample>(&bytes, &config),
            Err(BerError::BufferExhausted { .. })
        ));
    }
}
