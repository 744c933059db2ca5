//! z3950 - Rust implementation of the Z39.50 BER codec
//!
//! This library decodes byte buffers into typed Z39.50 APDUs and encodes
//! them back into canonical BER.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `z3950-core`: Value data types (OBJECT IDENTIFIER, GeneralizedTime, BIT STRING) and their errors
//! - `z3950-asn1`: BER engine, composite field engine and APDU definitions
//!
//! Transport, association state and record handling are left to the caller.
//!
//! # Usage
//!
//! ```
//! use z3950::{Apdu, BerConfig, Close, CloseReason, decode_apdu, encode_apdu};
//!
//! # fn main() -> Result<(), z3950::BerError> {
//! let bytes = encode_apdu(&Apdu::from(Close::new(CloseReason::Finished)))?;
//! let apdu = decode_apdu(&bytes, &BerConfig::default())?;
//! assert_eq!(apdu.name(), "Close");
//! # Ok(())
//! # }
//! ```

pub use z3950_core::{BitString, CoreError, CoreResult, GeneralizedTime, ObjectIdentifier};

pub use z3950_asn1::apdu::{
    Apdu, Close, CloseReason, DeleteFunction, DeleteResultSetRequest, External, ExternalEncoding,
    IdAuthentication, IdPass, Implementation, InfoCategory, InitOption, InitializeRequest,
    InitializeResponse, Information, OtherInformation, OtherInformationUnit, ProtocolVersion,
    ReferenceId, ResultSetId,
};
pub use z3950_asn1::ber::{
    BerConfig, BerDecode, BerDecoder, BerEncode, BerNode, IntegerPolicy, InternationalString,
    OctetString, Tag, TagClass, Tagging,
};
pub use z3950_asn1::{BerError, BerResult};

/// ASN.1 layer, for schema types beyond the APDUs provided here
pub mod asn1 {
    pub use z3950_asn1::*;
}

/// Decode a buffer holding exactly one APDU
///
/// # Errors
/// Any framing or schema error, or `TrailingData` if bytes follow the APDU.
pub fn decode_apdu(data: &[u8], config: &BerConfig) -> BerResult<Apdu> {
    let apdu = z3950_asn1::from_ber::<Apdu>(data, config)?;
    log::debug!("received {} ({} bytes)", apdu.name(), data.len());
    Ok(apdu)
}

/// Decode the APDU at the start of `data`
///
/// # Returns
/// `(apdu, bytes_consumed)`; bytes after the APDU are left for the next
/// call, so a receive buffer holding several APDUs can be drained in a loop.
pub fn decode_apdu_prefix(data: &[u8], config: &BerConfig) -> BerResult<(Apdu, usize)> {
    let mut decoder = BerDecoder::new(data, config);
    let (apdu, consumed) = decoder.decode_value::<Apdu>()?;
    log::debug!("received {} ({} of {} bytes)", apdu.name(), consumed, data.len());
    Ok((apdu, consumed))
}

/// Encode an APDU into canonical BER
pub fn encode_apdu(apdu: &Apdu) -> BerResult<Vec<u8>> {
    let bytes = z3950_asn1::to_ber(apdu)?;
    log::debug!("sending {} ({} bytes)", apdu.name(), bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() -> Apdu {
        Apdu::from(
            InitializeRequest::new(
                ProtocolVersion::bits(&[ProtocolVersion::Version3]),
                InitOption::bits(&[InitOption::Search, InitOption::Present, InitOption::DelSet]),
                64 * 1024,
                1024 * 1024,
            )
            .with_reference_id(ReferenceId::new("r1"))
            .with_id_authentication(IdAuthentication::Open("anonymous".into())),
        )
    }

    #[test]
    fn test_encode_decode_apdu() {
        let apdu = init();
        let bytes = encode_apdu(&apdu).unwrap();
        assert_eq!(decode_apdu(&bytes, &BerConfig::default()).unwrap(), apdu);
    }

    #[test]
    fn test_decode_apdu_prefix_drains_buffer() {
        let config = BerConfig::default();
        let first = init();
        let second = Apdu::from(DeleteResultSetRequest::all());
        let third = Apdu::from(Close::new(CloseReason::Shutdown));

        let mut buffer = Vec::new();
        for apdu in [&first, &second, &third] {
            buffer.extend(encode_apdu(apdu).unwrap());
        }

        let mut decoded = Vec::new();
        let mut offset = 0;
        while offset < buffer.len() {
            let (apdu, consumed) = decode_apdu_prefix(&buffer[offset..], &config).unwrap();
            decoded.push(apdu);
            offset += consumed;
        }
        assert_eq!(decoded, vec![first, second, third]);
    }

    #[test]
    fn test_decode_apdu_rejects_concatenation() {
        let mut bytes = encode_apdu(&init()).unwrap();
        bytes.extend(encode_apdu(&Apdu::from(DeleteResultSetRequest::all())).unwrap());
        assert!(matches!(
            decode_apdu(&bytes, &BerConfig::default()),
            Err(BerError::TrailingData { .. })
        ));
    }

    #[test]
    fn test_decode_apdu_prefix_truncated() {
        let bytes = encode_apdu(&init()).unwrap();
        let truncated = &bytes[..bytes.len() - 1];
        assert!(decode_apdu_prefix(truncated, &BerConfig::default()).is_err());
    }

    #[test]
    fn test_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Apdu>();
        assert_send_sync::<BerNode>();
        assert_send_sync::<BerConfig>();
        assert_send_sync::<BerError>();
    }

    #[test]
    fn test_lenient_integer_config() {
        // Close with closeReason encoded as 00 01 (non-minimal)
        let bytes = [0xBF, 0x30, 0x06, 0x9F, 0x81, 0x53, 0x02, 0x00, 0x01];
        assert!(decode_apdu(&bytes, &BerConfig::default()).is_err());

        let lenient = BerConfig::default().with_integer_policy(IntegerPolicy::Lenient);
        assert_eq!(
            decode_apdu(&bytes, &lenient).unwrap(),
            Apdu::from(Close::new(CloseReason::Shutdown))
        );
    }
}
