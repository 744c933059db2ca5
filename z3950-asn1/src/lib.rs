//! ASN.1 processing for the Z39.50 protocol
//!
//! This crate provides the BER engine (tags, lengths, node trees, primitive
//! codec and the composite field engine) and the Z39.50 APDU definitions
//! built on it.

pub mod error;
pub mod ber;
pub mod apdu;

pub use error::{BerError, BerResult};
pub use ber::{
    BerConfig, BerDecode, BerDecoder, BerEncode, BerEncoder, BerNode, Field, FieldReader,
    FieldWriter, IntegerPolicy, Sequence, Tag, TagClass, Tagging, from_ber, to_ber,
};
pub use apdu::Apdu;
