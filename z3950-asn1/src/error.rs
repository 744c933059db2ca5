//! Error taxonomy of the BER codec

use crate::ber::types::Tag;
use thiserror::Error;
use z3950_core::CoreError;

/// Structured decode/encode failure
///
/// None of these are recovered inside the codec. The only internal recovery
/// is the single-field rollback of a speculative optional field, see
/// [`FieldReader::optional`](crate::ber::FieldReader::optional).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BerError {
    #[error("Malformed tag: {0}")]
    MalformedTag(String),

    #[error("Malformed length: {0}")]
    MalformedLength(String),

    #[error("Unexpected tag for {field}: expected {}, found {found}", join_tags(.expected))]
    UnexpectedTag {
        field: &'static str,
        expected: Vec<Tag>,
        found: Tag,
    },

    #[error("Expected constructed encoding for {tag}")]
    ExpectedConstructed { tag: Tag },

    #[error("Expected primitive encoding for {tag}")]
    ExpectedPrimitive { tag: Tag },

    #[error("Incomplete encoding: mandatory {field} is missing")]
    Incomplete { field: &'static str },

    /// `remaining` counts unconsumed children inside a composite, or
    /// unconsumed bytes at message level
    #[error("Trailing data after {context}: {remaining} unconsumed")]
    TrailingData {
        context: &'static str,
        remaining: usize,
    },

    #[error("Malformed {kind} value: {reason}")]
    MalformedValue { kind: &'static str, reason: String },

    #[error("Nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("Buffer exhausted: need {needed} bytes, have {available}")]
    BufferExhausted { needed: usize, available: usize },
}

impl BerError {
    /// Tag mismatch against a single expected tag
    pub fn unexpected_tag(field: &'static str, expected: Tag, found: Tag) -> Self {
        BerError::UnexpectedTag {
            field,
            expected: vec![expected],
            found,
        }
    }

    /// Tag matches none of the alternatives of a CHOICE
    pub fn no_alternative(field: &'static str, alternatives: &[Tag], found: Tag) -> Self {
        BerError::UnexpectedTag {
            field,
            expected: alternatives.to_vec(),
            found,
        }
    }

    pub fn malformed_value(kind: &'static str, reason: impl Into<String>) -> Self {
        BerError::MalformedValue {
            kind,
            reason: reason.into(),
        }
    }
}

fn join_tags(tags: &[Tag]) -> String {
    tags.iter()
        .map(|tag| tag.to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}

impl From<CoreError> for BerError {
    fn from(err: CoreError) -> Self {
        let kind = match err {
            CoreError::InvalidObjectIdentifier(_) => "OBJECT IDENTIFIER",
            CoreError::InvalidGeneralizedTime(_) => "GeneralizedTime",
            CoreError::InvalidBitString(_) => "BIT STRING",
        };
        BerError::MalformedValue {
            kind,
            reason: err.to_string(),
        }
    }
}

/// Result type alias for BER operations
pub type BerResult<T> = Result<T, BerError>;
