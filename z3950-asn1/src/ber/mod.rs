//! BER (Basic Encoding Rules) encoder and decoder for ASN.1
//!
//! This module provides BER encoding/decoding for the ASN.1 structures of
//! the Z39.50 protocol.
//!
//! # ASN.1 BER Encoding Overview
//!
//! Each ASN.1 value is encoded as a TLV (Tag-Length-Value) triplet:
//!
//! ```text
//! [Tag] [Length] [Value]
//! ```
//!
//! ## Tag Encoding
//!
//! ```text
//! Bits: 8 7 6 5 4 3 2 1
//!       C C P T T T T T
//! ```
//! Where:
//! - CC = Class (00=Universal, 01=Application, 10=Context, 11=Private)
//! - P = Primitive (0) or Constructed (1)
//! - TTTTT = Tag number (0-30), or 11111 followed by base-128 octets
//!
//! Z39.50 uses context tags well above 30 (`[201]` OtherInformation,
//! `[211]` closeReason), so the extended form is on the hot path.
//!
//! ## Length Encoding
//!
//! - **Short form** (1 byte): lengths 0-127
//! - **Long form**: `0x80 | n` followed by `n` big-endian length octets
//!
//! Indefinite length (`0x80`) is not supported and fails fast.
//!
//! # Layers
//!
//! 1. [`Tag`] and the length codec frame every unit.
//! 2. [`BerDecoder`] parses bytes into a [`BerNode`] tree; [`BerEncoder`]
//!    serializes it back.
//! 3. [`Primitive`] types map content octets to values.
//! 4. The composite engine ([`FieldReader`], [`FieldWriter`], [`Sequence`])
//!    walks node children against declarative [`Field`] descriptors.
//!
//! # Limits
//!
//! [`BerConfig`] bounds nesting depth, tag and length octet counts and the
//! total bytes consumed per message.

pub mod composite;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod node;
pub mod primitive;
pub mod types;

pub use composite::{
    BerDecode, BerEncode, Checkpoint, Field, FieldReader, FieldWriter, Sequence, Tagging,
    decode_fields, decode_sequence_of, encode_fields, encode_sequence_of, from_ber,
    from_ber_tagged, to_ber, to_ber_tagged,
};
pub use config::{BerConfig, IntegerPolicy};
pub use decoder::BerDecoder;
pub use encoder::BerEncoder;
pub use node::{BerNode, Content};
pub use primitive::{
    InternationalString, Null, ObjectDescriptor, OctetString, Primitive, VisibleString,
};
pub use types::{Tag, TagClass, decode_length, encode_length, length_encoded_len};
