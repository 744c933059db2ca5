//! BER encoder: [`BerNode`] trees and typed values to bytes
//!
//! # Usage Example
//!
//! ```rust
//! use z3950_asn1::ber::{BerEncoder, Tag, Tagging};
//!
//! # fn main() -> Result<(), z3950_asn1::BerError> {
//! let mut encoder = BerEncoder::new();
//! encoder.encode_value(&12345i64)?;
//! encoder.encode_tagged(&true, Tagging::Implicit(Tag::context(5)))?;
//! let bytes = encoder.into_bytes();
//! # assert_eq!(bytes.len(), 7);
//! # Ok(())
//! # }
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::ber::composite::{BerEncode, Tagging};
use crate::ber::node::{BerNode, Content};
use crate::ber::types::{Tag, encode_length_into};
use crate::error::BerResult;

/// BER encoder
///
/// Always emits definite lengths in their minimal form and tags in their
/// minimal form, so encoding a given node tree is deterministic.
pub struct BerEncoder {
    buffer: BytesMut,
}

impl BerEncoder {
    /// Create a new BER encoder
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
        }
    }

    /// Create a new BER encoder with initial capacity in bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Write identifier and length octets
    pub fn write_header(&mut self, tag: Tag, constructed: bool, content_len: usize) {
        tag.encode_into(constructed, &mut self.buffer);
        encode_length_into(content_len, &mut self.buffer);
    }

    /// Serialize a node and all its descendants
    pub fn write_node(&mut self, node: &BerNode) {
        match node.content() {
            Content::Primitive(bytes) => {
                self.write_header(node.tag(), false, bytes.len());
                self.buffer.put_slice(bytes);
            }
            Content::Constructed(children) => {
                self.write_header(node.tag(), true, node.content_len());
                for child in children {
                    self.write_node(child);
                }
            }
        }
    }

    /// Encode a typed value under its own tag
    pub fn encode_value<T: BerEncode + ?Sized>(&mut self, value: &T) -> BerResult<()> {
        let node = value.encode()?;
        self.write_node(&node);
        Ok(())
    }

    /// Encode a typed value under a caller-supplied tagging
    pub fn encode_tagged<T: BerEncode + ?Sized>(&mut self, value: &T, tagging: Tagging) -> BerResult<()> {
        let node = value.encode_tagged(tagging)?;
        self.write_node(&node);
        Ok(())
    }

    /// Number of bytes encoded so far
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.to_vec()
    }

    /// Get the encoded bytes without copying
    pub fn freeze(self) -> Bytes {
        self.buffer.freeze()
    }

    /// Get a reference to the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Clear the encoder buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for BerEncoder {
    fn default() -> Self {
        Self::new()
    }
}
