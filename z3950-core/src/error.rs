use thiserror::Error;

/// Validation error for Z39.50 value types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid object identifier: {0}")]
    InvalidObjectIdentifier(String),

    #[error("Invalid GeneralizedTime: {0}")]
    InvalidGeneralizedTime(String),

    #[error("Invalid bit string: {0}")]
    InvalidBitString(String),
}

/// Result type alias for value validation
pub type CoreResult<T> = Result<T, CoreError>;
