//! Z39.50 APDU definitions
//!
//! This module provides Z39.50 (ANSI/NISO Z39.50-1995, ISO 23950) structures
//! written against the composite field engine in [`crate::ber`].
//!
//! # Main PDU Types
//!
//! - **initRequest**: Initialize Request (context tag 20)
//! - **initResponse**: Initialize Response (context tag 21)
//! - **deleteResultSetRequest**: Delete Result Set Request (context tag 26)
//! - **close**: Close (context tag 48)
//!
//! # Usage
//!
//! ```rust
//! use z3950_asn1::apdu::{Apdu, InitOption, InitializeRequest, ProtocolVersion};
//! use z3950_asn1::ber::{BerConfig, from_ber, to_ber};
//!
//! # fn main() -> Result<(), z3950_asn1::BerError> {
//! let init = InitializeRequest::new(
//!     ProtocolVersion::bits(&[ProtocolVersion::Version3]),
//!     InitOption::bits(&[InitOption::Search, InitOption::Present]),
//!     1024 * 1024,
//!     1024 * 1024,
//! );
//! let encoded = to_ber(&Apdu::from(init))?;
//! let decoded: Apdu = from_ber(&encoded, &BerConfig::default())?;
//! # assert_eq!(decoded.name(), "InitializeRequest");
//! # Ok(())
//! # }
//! ```

pub mod pdu;
pub mod types;

pub use pdu::{Apdu, Close, DeleteResultSetRequest, Implementation, InitializeRequest, InitializeResponse};
pub use types::*;

/// Z39.50 object identifier root: {1 2 840 10003}
pub const Z3950_ROOT: &[u32] = &[1, 2, 840, 10003];

/// bib-1 attribute set: {1 2 840 10003 3 1}
pub const BIB1_ATTRIBUTE_SET: &[u32] = &[1, 2, 840, 10003, 3, 1];

/// bib-1 diagnostic set: {1 2 840 10003 4 1}
pub const BIB1_DIAGNOSTIC_SET: &[u32] = &[1, 2, 840, 10003, 4, 1];

/// USMARC record syntax: {1 2 840 10003 5 10}
pub const USMARC: &[u32] = &[1, 2, 840, 10003, 5, 10];

/// SUTRS record syntax: {1 2 840 10003 5 101}
pub const SUTRS: &[u32] = &[1, 2, 840, 10003, 5, 101];

/// XML record syntax: {1 2 840 10003 5 109 10}
pub const XML: &[u32] = &[1, 2, 840, 10003, 5, 109, 10];

/// resource-1 resource report format: {1 2 840 10003 7 1}
pub const RESOURCE_REPORT_1: &[u32] = &[1, 2, 840, 10003, 7, 1];

/// Character set and language negotiation user information: {1 2 840 10003 15 3}
pub const USER_INFO_CHARSET_NEGOTIATION: &[u32] = &[1, 2, 840, 10003, 15, 3];
