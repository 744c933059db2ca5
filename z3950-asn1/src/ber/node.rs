//! Generic in-memory representation of one BER unit

use bytes::Bytes;

use crate::ber::config::BerConfig;
use crate::ber::decoder::BerDecoder;
use crate::ber::encoder::BerEncoder;
use crate::ber::types::{Tag, length_encoded_len};
use crate::error::{BerError, BerResult};

/// Content octets of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Raw content octets of a primitive encoding
    Primitive(Bytes),
    /// Ordered children of a constructed encoding
    Constructed(Vec<BerNode>),
}

/// One tag + length + content unit
///
/// A node exclusively owns its children, so a tree has no sharing and no
/// cycles. The length prefix is never stored: it is derived from the content
/// when the node is serialized, which keeps a primitive node's length equal
/// to its content length and a constructed node's length equal to the sum of
/// its children's encoded sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BerNode {
    tag: Tag,
    content: Content,
}

impl BerNode {
    pub fn primitive(tag: Tag, content: impl Into<Bytes>) -> Self {
        Self {
            tag,
            content: Content::Primitive(content.into()),
        }
    }

    pub fn constructed(tag: Tag, children: Vec<BerNode>) -> Self {
        Self {
            tag,
            content: Content::Constructed(children),
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn is_constructed(&self) -> bool {
        matches!(self.content, Content::Constructed(_))
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Content octets of a primitive node
    ///
    /// # Errors
    /// `ExpectedPrimitive` if the node is constructed.
    pub fn raw_content(&self) -> BerResult<&[u8]> {
        match &self.content {
            Content::Primitive(bytes) => Ok(&bytes[..]),
            Content::Constructed(_) => Err(BerError::ExpectedPrimitive { tag: self.tag }),
        }
    }

    /// Children of a constructed node
    ///
    /// # Errors
    /// `ExpectedConstructed` if the node is primitive.
    pub fn children(&self) -> BerResult<&[BerNode]> {
        match &self.content {
            Content::Constructed(children) => Ok(children.as_slice()),
            Content::Primitive(_) => Err(BerError::ExpectedConstructed { tag: self.tag }),
        }
    }

    /// Check the node's tag, naming `field` in the error
    pub fn expect_tag(&self, field: &'static str, expected: Tag) -> BerResult<()> {
        if self.tag == expected {
            Ok(())
        } else {
            Err(BerError::unexpected_tag(field, expected, self.tag))
        }
    }

    /// IMPLICIT tagging: replace this node's tag in place
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = tag;
        self
    }

    /// EXPLICIT tagging: wrap this node in a constructed node carrying `tag`
    pub fn explicit(self, tag: Tag) -> Self {
        Self::constructed(tag, vec![self])
    }

    /// The single child of an explicitly tagged node
    ///
    /// # Errors
    /// `ExpectedConstructed` for a primitive node, `Incomplete` for an empty
    /// wrapper, `TrailingData` for more than one child.
    pub fn explicit_inner(&self, field: &'static str) -> BerResult<&BerNode> {
        match self.children()? {
            [inner] => Ok(inner),
            [] => Err(BerError::Incomplete { field }),
            [_, rest @ ..] => Err(BerError::TrailingData {
                context: field,
                remaining: rest.len(),
            }),
        }
    }

    /// Number of content octets
    pub fn content_len(&self) -> usize {
        match &self.content {
            Content::Primitive(bytes) => bytes.len(),
            Content::Constructed(children) => children.iter().map(BerNode::encoded_len).sum(),
        }
    }

    /// Total encoded size: identifier + length + content octets
    pub fn encoded_len(&self) -> usize {
        let content_len = self.content_len();
        self.tag.encoded_len() + length_encoded_len(content_len) + content_len
    }

    /// Serialize this node
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut encoder = BerEncoder::with_capacity(self.encoded_len());
        encoder.write_node(self);
        encoder.into_bytes()
    }

    /// Parse exactly one node from `data`
    ///
    /// # Errors
    /// Any framing error, or `TrailingData` if bytes remain after the node.
    pub fn from_bytes(data: &[u8], config: &BerConfig) -> BerResult<Self> {
        let mut decoder = BerDecoder::new(data, config);
        let (node, _) = decoder.parse_node()?;
        decoder.finish()?;
        Ok(node)
    }
}
