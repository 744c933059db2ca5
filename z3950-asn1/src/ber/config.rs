//! Decoder limits and policies

use serde::{Deserialize, Serialize};

/// How INTEGER contents with redundant leading octets are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegerPolicy {
    /// Reject redundant leading `0x00`/`0xFF` octets
    #[default]
    Strict,
    /// Accept them and normalise the value
    Lenient,
}

/// Limits applied while decoding untrusted input
///
/// Every limit is checked at the point it guards: `max_depth` at each
/// recursive descent, `max_tag_octets` and `max_length_octets` while reading
/// an identifier or length, `max_message_len` against the cumulative number
/// of bytes a decoder has been asked to consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BerConfig {
    /// Maximum nesting of constructed nodes (the outermost node is level 0)
    pub max_depth: usize,
    /// Maximum number of continuation octets of an extended tag number
    pub max_tag_octets: usize,
    /// Maximum number of octets following a long-form length prefix
    pub max_length_octets: usize,
    /// Maximum number of bytes one decoder may consume
    pub max_message_len: usize,
    pub integer_policy: IntegerPolicy,
}

impl BerConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 32;
    pub const DEFAULT_MAX_TAG_OCTETS: usize = 5;
    pub const DEFAULT_MAX_LENGTH_OCTETS: usize = 4;
    pub const DEFAULT_MAX_MESSAGE_LEN: usize = 16 * 1024 * 1024;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_tag_octets(mut self, max_tag_octets: usize) -> Self {
        self.max_tag_octets = max_tag_octets;
        self
    }

    /// Capped at the width of `usize`
    pub fn with_max_length_octets(mut self, max_length_octets: usize) -> Self {
        self.max_length_octets = max_length_octets.min(std::mem::size_of::<usize>());
        self
    }

    pub fn with_max_message_len(mut self, max_message_len: usize) -> Self {
        self.max_message_len = max_message_len;
        self
    }

    pub fn with_integer_policy(mut self, integer_policy: IntegerPolicy) -> Self {
        self.integer_policy = integer_policy;
        self
    }
}

impl Default for BerConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_tag_octets: Self::DEFAULT_MAX_TAG_OCTETS,
            max_length_octets: Self::DEFAULT_MAX_LENGTH_OCTETS,
            max_message_len: Self::DEFAULT_MAX_MESSAGE_LEN,
            integer_policy: IntegerPolicy::Strict,
        }
    }
}
