//! BER decoder: bytes to [`BerNode`] trees and typed values
//!
//! # Usage Example
//!
//! ```rust
//! use z3950_asn1::ber::{BerConfig, BerDecoder};
//!
//! # fn main() -> Result<(), z3950_asn1::BerError> {
//! let data = [0x02, 0x02, 0x00, 0x80];
//! let config = BerConfig::default();
//! let mut decoder = BerDecoder::new(&data, &config);
//! let (value, consumed): (i64, usize) = decoder.decode_value()?;
//! assert_eq!((value, consumed), (128, 4));
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;

use crate::ber::composite::BerDecode;
use crate::ber::config::BerConfig;
use crate::ber::node::BerNode;
use crate::ber::types::{Tag, decode_length};
use crate::error::{BerError, BerResult};

/// BER decoder over an in-memory buffer
///
/// # Position Tracking
///
/// The decoder maintains a position that advances past each parsed node, so
/// sibling nodes can be read one after another from the same buffer.
///
/// # Limits
///
/// Nesting depth is checked at each recursive descent; the cumulative number
/// of bytes consumed from the starting offset is bounded by
/// `config.max_message_len`.
pub struct BerDecoder<'a> {
    buffer: &'a [u8],
    start: usize,
    position: usize,
    config: &'a BerConfig,
}

impl<'a> BerDecoder<'a> {
    /// Create a decoder positioned at the start of `buffer`
    pub fn new(buffer: &'a [u8], config: &'a BerConfig) -> Self {
        Self::at(buffer, 0, config)
    }

    /// Create a decoder positioned at `offset`
    ///
    /// An offset past the end of the buffer leaves nothing to decode.
    pub fn at(buffer: &'a [u8], offset: usize, config: &'a BerConfig) -> Self {
        let offset = offset.min(buffer.len());
        Self {
            buffer,
            start: offset,
            position: offset,
            config,
        }
    }

    pub fn config(&self) -> &'a BerConfig {
        self.config
    }

    /// Get current position in buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get remaining bytes
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    /// Check if there is more data to decode
    pub fn has_remaining(&self) -> bool {
        self.position < self.buffer.len()
    }

    /// Parse one node at the current position
    ///
    /// # Returns
    /// `(node, bytes_consumed)`, where `bytes_consumed` is exactly the
    /// identifier + length + content octets of the node. The decoder is left
    /// positioned at the following sibling.
    ///
    /// On error the position is restored to where the call started.
    pub fn parse_node(&mut self) -> BerResult<(BerNode, usize)> {
        let start = self.position;
        match self.parse_within(self.buffer.len(), 0) {
            Ok(node) => Ok((node, self.position - start)),
            Err(err) => {
                self.position = start;
                Err(err)
            }
        }
    }

    /// Parse one node and decode it as `T`, checking `T`'s own tag
    pub fn decode_value<T: BerDecode>(&mut self) -> BerResult<(T, usize)> {
        let start = self.position;
        let (node, consumed) = self.parse_node()?;
        match T::decode(&node, true, self.config) {
            Ok(value) => Ok((value, consumed)),
            Err(err) => {
                self.position = start;
                Err(err)
            }
        }
    }

    /// Require that the whole buffer has been consumed
    ///
    /// # Errors
    /// `TrailingData` with the number of unconsumed bytes.
    pub fn finish(&self) -> BerResult<()> {
        if self.has_remaining() {
            return Err(BerError::TrailingData {
                context: "message",
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Parse a node that must end at or before `end`
    fn parse_within(&mut self, end: usize, depth: usize) -> BerResult<BerNode> {
        if depth >= self.config.max_depth {
            return Err(BerError::NestingTooDeep {
                limit: self.config.max_depth,
            });
        }

        let (tag, constructed, tag_len) = Tag::decode(&self.buffer[self.position..end], self.config)?;
        self.position += tag_len;

        let (length, length_len) = decode_length(&self.buffer[self.position..end], self.config)?;
        self.position += length_len;

        let available = end - self.position;
        if length > available {
            return Err(BerError::MalformedLength(format!(
                "{} declares {} content bytes, only {} remain",
                tag, length, available
            )));
        }

        let content_end = self.position + length;
        let budget = self.config.max_message_len;
        if content_end - self.start > budget {
            return Err(BerError::BufferExhausted {
                needed: content_end - self.start,
                available: budget,
            });
        }

        log::trace!(
            "BER node {} {} length {} at depth {}",
            tag,
            if constructed { "constructed" } else { "primitive" },
            length,
            depth
        );

        if constructed {
            let mut children = Vec::new();
            while self.position < content_end {
                children.push(self.parse_within(content_end, depth + 1)?);
            }
            Ok(BerNode::constructed(tag, children))
        } else {
            let content = Bytes::copy_from_slice(&self.buffer[self.position..content_end]);
            self.position = content_end;
            Ok(BerNode::primitive(tag, content))
        }
    }
}
