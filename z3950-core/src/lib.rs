//! Core types and utilities for the Z39.50 BER codec
//!
//! This crate provides the value types carried inside BER primitives and the
//! error type raised when such a value fails validation. The wire format
//! itself lives in `z3950-asn1`.

pub mod error;
pub mod datatypes;

pub use error::{CoreError, CoreResult};
pub use datatypes::{BitString, GeneralizedTime, ObjectIdentifier};
