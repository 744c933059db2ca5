//! Z39.50 building-block types shared by the APDUs
//!
//! # Tagging
//!
//! The Z39.50 ASN.1 module tags nearly every field IMPLICIT with a
//! context-specific number. The exceptions handled here are:
//! - CHOICE types, which have no tag of their own and are dispatched on the
//!   tag of the chosen alternative
//! - `single-ASN1-type [0] ANY` inside EXTERNAL, which is EXPLICIT
//!
//! `ReferenceId` and `OtherInformation` carry their own context tags and
//! appear untagged as fields, so enclosing PDUs decode them speculatively.

use std::fmt;

use z3950_core::{BitString, ObjectIdentifier};

use crate::ber::{
    BerConfig, BerDecode, BerEncode, BerNode, Field, FieldReader, FieldWriter,
    InternationalString, Null, ObjectDescriptor, OctetString, Sequence, Tag, Tagging,
    VisibleString,
};
use crate::error::{BerError, BerResult};
use crate::sequence_value;

/// A value type that is its inner type re-tagged `[n] IMPLICIT`
macro_rules! implicit_newtype {
    ($(#[$meta:meta])* $name:ident($inner:ty), $tag:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Default)]
        pub struct $name($inner);

        impl $name {
            pub const TAG: Tag = $tag;

            pub fn new(value: impl Into<$inner>) -> Self {
                Self(value.into())
            }

            pub fn get(&self) -> &$inner {
                &self.0
            }

            pub fn into_inner(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl BerDecode for $name {
            fn natural_tag() -> Option<Tag> {
                Some(Self::TAG)
            }

            fn decode(node: &BerNode, check_tag: bool, config: &BerConfig) -> BerResult<Self> {
                if check_tag {
                    node.expect_tag(stringify!($name), Self::TAG)?;
                }
                Ok(Self(<$inner as BerDecode>::decode(node, false, config)?))
            }
        }

        impl BerEncode for $name {
            fn encode(&self) -> BerResult<BerNode> {
                self.0.encode_tagged(Tagging::Implicit(Self::TAG))
            }
        }
    };
}

/// An INTEGER restricted to a fixed set of named values
macro_rules! named_integer {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value),*
        }

        impl $name {
            /// Create from integer value
            pub fn from_value(value: i64) -> BerResult<Self> {
                match value {
                    $($value => Ok($name::$variant),)*
                    _ => Err(BerError::malformed_value(
                        stringify!($name),
                        format!("unknown value {}", value),
                    )),
                }
            }

            /// Get integer value
            pub fn value(self) -> i64 {
                self as i64
            }
        }

        impl BerDecode for $name {
            fn natural_tag() -> Option<Tag> {
                Some(Tag::INTEGER)
            }

            fn decode(node: &BerNode, check_tag: bool, config: &BerConfig) -> BerResult<Self> {
                Self::from_value(i64::decode(node, check_tag, config)?)
            }
        }

        impl BerEncode for $name {
            fn encode(&self) -> BerResult<BerNode> {
                self.value().encode()
            }
        }
    };
}

implicit_newtype!(
    /// `ReferenceId ::= [2] IMPLICIT OCTET STRING`
    ///
    /// Opaque correlation value echoed by the target in the matching response.
    ReferenceId(OctetString),
    Tag::context(2)
);

implicit_newtype!(
    /// `ResultSetId ::= [31] IMPLICIT InternationalString`
    ResultSetId(InternationalString),
    Tag::context(31)
);

implicit_newtype!(
    /// `OtherInformation ::= [201] IMPLICIT SEQUENCE OF SEQUENCE { ... }`
    OtherInformation(Vec<OtherInformationUnit>),
    Tag::context(201)
);

impl OtherInformation {
    pub fn units(&self) -> &[OtherInformationUnit] {
        &self.0
    }
}

named_integer!(
    /// Reason carried by a Close APDU
    CloseReason {
        Finished = 0,
        Shutdown = 1,
        SystemProblem = 2,
        CostLimit = 3,
        Resources = 4,
        SecurityViolation = 5,
        ProtocolError = 6,
        LackOfActivity = 7,
        PeerAbort = 8,
        Unspecified = 9,
    }
);

named_integer!(
    /// Scope of a Delete Result Set request
    DeleteFunction {
        /// Delete the listed result sets
        List = 0,
        /// Delete every result set of the association
        All = 1,
    }
);

/// Bits of the `ProtocolVersion` BIT STRING
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    Version1 = 0,
    Version2 = 1,
    Version3 = 2,
}

impl ProtocolVersion {
    /// BIT STRING with one bit set per supported version
    pub fn bits(versions: &[ProtocolVersion]) -> BitString {
        set_bits(3, versions.iter().map(|version| *version as usize))
    }
}

/// Bits of the `Options` BIT STRING negotiated by Init
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitOption {
    Search = 0,
    Present = 1,
    DelSet = 2,
    ResourceReport = 3,
    TriggerResourceCtrl = 4,
    ResourceCtrl = 5,
    AccessCtrl = 6,
    Scan = 7,
    Sort = 8,
    ExtendedServices = 10,
    Level1Segmentation = 11,
    Level2Segmentation = 12,
    ConcurrentOperations = 13,
    NamedResultSets = 14,
    Encapsulation = 15,
    ResultCount = 16,
    NegotiationModel = 17,
    DuplicateDetection = 18,
    QueryType104 = 19,
    PqesCorrection = 20,
    StringSchema = 21,
}

impl InitOption {
    /// BIT STRING with one bit set per option
    pub fn bits(options: &[InitOption]) -> BitString {
        let len = options
            .iter()
            .map(|option| *option as usize + 1)
            .max()
            .unwrap_or(0);
        set_bits(len, options.iter().map(|option| *option as usize))
    }

    /// Whether `option` is set in an options BIT STRING
    pub fn is_set(options: &BitString, option: InitOption) -> bool {
        options.get_bit(option as usize).unwrap_or(false)
    }
}

fn set_bits(num_bits: usize, indices: impl Iterator<Item = usize>) -> BitString {
    let mut bits = vec![false; num_bits];
    for index in indices {
        bits[index] = true;
    }
    BitString::from_bits(&bits)
}

/// `encoding` CHOICE of EXTERNAL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalEncoding {
    /// `single-ASN1-type [0] ANY`, carried verbatim
    SingleAsn1Type(BerNode),
    /// `octet-aligned [1] IMPLICIT OCTET STRING`
    OctetAligned(OctetString),
    /// `arbitrary [2] IMPLICIT BIT STRING`
    Arbitrary(BitString),
}

impl ExternalEncoding {
    const SINGLE_ASN1_TYPE: Tag = Tag::context(0);
    const OCTET_ALIGNED: Tag = Tag::context(1);
    const ARBITRARY: Tag = Tag::context(2);
    const ALTERNATIVES: [Tag; 3] = [Self::SINGLE_ASN1_TYPE, Self::OCTET_ALIGNED, Self::ARBITRARY];
}

impl BerDecode for ExternalEncoding {
    fn natural_tag() -> Option<Tag> {
        None
    }

    fn decode(node: &BerNode, _check_tag: bool, config: &BerConfig) -> BerResult<Self> {
        match node.tag() {
            Self::SINGLE_ASN1_TYPE => Ok(ExternalEncoding::SingleAsn1Type(
                node.explicit_inner("single-ASN1-type")?.clone(),
            )),
            Self::OCTET_ALIGNED => Ok(ExternalEncoding::OctetAligned(OctetString::decode(
                node, false, config,
            )?)),
            Self::ARBITRARY => Ok(ExternalEncoding::Arbitrary(BitString::decode(
                node, false, config,
            )?)),
            other => Err(BerError::no_alternative("encoding", &Self::ALTERNATIVES, other)),
        }
    }
}

impl BerEncode for ExternalEncoding {
    const IMPLICIT_TAGGABLE: bool = false;

    fn encode(&self) -> BerResult<BerNode> {
        match self {
            ExternalEncoding::SingleAsn1Type(node) => Ok(node.clone().explicit(Self::SINGLE_ASN1_TYPE)),
            ExternalEncoding::OctetAligned(bytes) => bytes.encode_tagged(Tagging::Implicit(Self::OCTET_ALIGNED)),
            ExternalEncoding::Arbitrary(bits) => bits.encode_tagged(Tagging::Implicit(Self::ARBITRARY)),
        }
    }
}

/// EXTERNAL: a value of a type identified at run time
///
/// Used by Z39.50 for user information, resource reports and externally
/// defined other-information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct External {
    direct_reference: Option<ObjectIdentifier>,
    indirect_reference: Option<i64>,
    data_value_descriptor: Option<ObjectDescriptor>,
    encoding: ExternalEncoding,
}

impl External {
    const DIRECT_REFERENCE: Field = Field::untagged("direct-reference");
    const INDIRECT_REFERENCE: Field = Field::untagged("indirect-reference");
    const DATA_VALUE_DESCRIPTOR: Field = Field::untagged("data-value-descriptor");
    const ENCODING: Field = Field::untagged("encoding");

    pub fn new(encoding: ExternalEncoding) -> Self {
        Self {
            direct_reference: None,
            indirect_reference: None,
            data_value_descriptor: None,
            encoding,
        }
    }

    /// An EXTERNAL identified by OID carrying a single ASN.1 value
    pub fn with_asn1(direct_reference: ObjectIdentifier, value: BerNode) -> Self {
        Self::new(ExternalEncoding::SingleAsn1Type(value)).with_direct_reference(direct_reference)
    }

    /// An EXTERNAL identified by OID carrying octets, e.g. a MARC record
    pub fn with_octets(direct_reference: ObjectIdentifier, octets: impl Into<OctetString>) -> Self {
        Self::new(ExternalEncoding::OctetAligned(octets.into())).with_direct_reference(direct_reference)
    }

    pub fn with_direct_reference(mut self, oid: ObjectIdentifier) -> Self {
        self.direct_reference = Some(oid);
        self
    }

    pub fn with_indirect_reference(mut self, reference: i64) -> Self {
        self.indirect_reference = Some(reference);
        self
    }

    pub fn with_data_value_descriptor(mut self, descriptor: impl Into<ObjectDescriptor>) -> Self {
        self.data_value_descriptor = Some(descriptor.into());
        self
    }

    pub fn direct_reference(&self) -> Option<&ObjectIdentifier> {
        self.direct_reference.as_ref()
    }

    pub fn indirect_reference(&self) -> Option<i64> {
        self.indirect_reference
    }

    pub fn data_value_descriptor(&self) -> Option<&ObjectDescriptor> {
        self.data_value_descriptor.as_ref()
    }

    pub fn encoding(&self) -> &ExternalEncoding {
        &self.encoding
    }
}

impl Sequence for External {
    const NAME: &'static str = "EXTERNAL";
    const TAG: Tag = Tag::EXTERNAL;

    fn read_fields(reader: &mut FieldReader<'_>) -> BerResult<Self> {
        Ok(Self {
            direct_reference: reader.optional(Self::DIRECT_REFERENCE)?,
            indirect_reference: reader.optional(Self::INDIRECT_REFERENCE)?,
            data_value_descriptor: reader.optional(Self::DATA_VALUE_DESCRIPTOR)?,
            encoding: reader.mandatory(Self::ENCODING)?,
        })
    }

    fn write_fields(&self, writer: &mut FieldWriter) -> BerResult<()> {
        writer
            .optional(Self::DIRECT_REFERENCE, self.direct_reference.as_ref())?
            .optional(Self::INDIRECT_REFERENCE, self.indirect_reference.as_ref())?
            .optional(Self::DATA_VALUE_DESCRIPTOR, self.data_value_descriptor.as_ref())?
            .mandatory(Self::ENCODING, &self.encoding)?;
        Ok(())
    }
}

/// `InfoCategory ::= SEQUENCE { categoryTypeId [1] OPTIONAL, categoryValue [2] }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoCategory {
    category_type_id: Option<ObjectIdentifier>,
    category_value: i64,
}

impl InfoCategory {
    const CATEGORY_TYPE_ID: Field = Field::implicit("categoryTypeId", 1);
    const CATEGORY_VALUE: Field = Field::implicit("categoryValue", 2);

    pub fn new(category_value: i64) -> Self {
        Self {
            category_type_id: None,
            category_value,
        }
    }

    pub fn with_category_type_id(mut self, oid: ObjectIdentifier) -> Self {
        self.category_type_id = Some(oid);
        self
    }

    pub fn category_type_id(&self) -> Option<&ObjectIdentifier> {
        self.category_type_id.as_ref()
    }

    pub fn category_value(&self) -> i64 {
        self.category_value
    }
}

impl Sequence for InfoCategory {
    const NAME: &'static str = "InfoCategory";

    fn read_fields(reader: &mut FieldReader<'_>) -> BerResult<Self> {
        Ok(Self {
            category_type_id: reader.optional(Self::CATEGORY_TYPE_ID)?,
            category_value: reader.mandatory(Self::CATEGORY_VALUE)?,
        })
    }

    fn write_fields(&self, writer: &mut FieldWriter) -> BerResult<()> {
        writer
            .optional(Self::CATEGORY_TYPE_ID, self.category_type_id.as_ref())?
            .mandatory(Self::CATEGORY_VALUE, &self.category_value)?;
        Ok(())
    }
}

/// `information` CHOICE of an OtherInformation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Information {
    /// `characterInfo [2] IMPLICIT InternationalString`
    CharacterInfo(InternationalString),
    /// `binaryInfo [3] IMPLICIT OCTET STRING`
    BinaryInfo(OctetString),
    /// `externallyDefinedInfo [4] IMPLICIT EXTERNAL`
    ExternallyDefinedInfo(External),
    /// `oid [5] IMPLICIT OBJECT IDENTIFIER`
    Oid(ObjectIdentifier),
}

impl Information {
    const CHARACTER_INFO: Tag = Tag::context(2);
    const BINARY_INFO: Tag = Tag::context(3);
    const EXTERNALLY_DEFINED_INFO: Tag = Tag::context(4);
    const OID: Tag = Tag::context(5);
    const ALTERNATIVES: [Tag; 4] = [
        Self::CHARACTER_INFO,
        Self::BINARY_INFO,
        Self::EXTERNALLY_DEFINED_INFO,
        Self::OID,
    ];
}

impl BerDecode for Information {
    fn natural_tag() -> Option<Tag> {
        None
    }

    fn decode(node: &BerNode, _check_tag: bool, config: &BerConfig) -> BerResult<Self> {
        match node.tag() {
            Self::CHARACTER_INFO => Ok(Information::CharacterInfo(InternationalString::decode(
                node, false, config,
            )?)),
            Self::BINARY_INFO => Ok(Information::BinaryInfo(OctetString::decode(node, false, config)?)),
            Self::EXTERNALLY_DEFINED_INFO => Ok(Information::ExternallyDefinedInfo(External::decode(
                node, false, config,
            )?)),
            Self::OID => Ok(Information::Oid(ObjectIdentifier::decode(node, false, config)?)),
            other => Err(BerError::no_alternative("information", &Self::ALTERNATIVES, other)),
        }
    }
}

impl BerEncode for Information {
    const IMPLICIT_TAGGABLE: bool = false;

    fn encode(&self) -> BerResult<BerNode> {
        match self {
            Information::CharacterInfo(text) => text.encode_tagged(Tagging::Implicit(Self::CHARACTER_INFO)),
            Information::BinaryInfo(bytes) => bytes.encode_tagged(Tagging::Implicit(Self::BINARY_INFO)),
            Information::ExternallyDefinedInfo(external) => {
                external.encode_tagged(Tagging::Implicit(Self::EXTERNALLY_DEFINED_INFO))
            }
            Information::Oid(oid) => oid.encode_tagged(Tagging::Implicit(Self::OID)),
        }
    }
}

/// One element of OtherInformation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherInformationUnit {
    category: Option<InfoCategory>,
    information: Information,
}

impl OtherInformationUnit {
    const CATEGORY: Field = Field::implicit("category", 1);
    const INFORMATION: Field = Field::untagged("information");

    pub fn new(information: Information) -> Self {
        Self {
            category: None,
            information,
        }
    }

    pub fn with_category(mut self, category: InfoCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn category(&self) -> Option<&InfoCategory> {
        self.category.as_ref()
    }

    pub fn information(&self) -> &Information {
        &self.information
    }
}

impl Sequence for OtherInformationUnit {
    const NAME: &'static str = "OtherInformation";

    fn read_fields(reader: &mut FieldReader<'_>) -> BerResult<Self> {
        Ok(Self {
            category: reader.optional(Self::CATEGORY)?,
            information: reader.mandatory(Self::INFORMATION)?,
        })
    }

    fn write_fields(&self, writer: &mut FieldWriter) -> BerResult<()> {
        writer
            .optional(Self::CATEGORY, self.category.as_ref())?
            .mandatory(Self::INFORMATION, &self.information)?;
        Ok(())
    }
}

/// `idPass` alternative of IdAuthentication
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdPass {
    group_id: Option<InternationalString>,
    user_id: Option<InternationalString>,
    password: Option<InternationalString>,
}

impl IdPass {
    const GROUP_ID: Field = Field::implicit("groupId", 0);
    const USER_ID: Field = Field::implicit("userId", 1);
    const PASSWORD: Field = Field::implicit("password", 2);

    pub fn new(user_id: impl Into<InternationalString>, password: impl Into<InternationalString>) -> Self {
        Self {
            group_id: None,
            user_id: Some(user_id.into()),
            password: Some(password.into()),
        }
    }

    pub fn with_group_id(mut self, group_id: impl Into<InternationalString>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn group_id(&self) -> Option<&InternationalString> {
        self.group_id.as_ref()
    }

    pub fn user_id(&self) -> Option<&InternationalString> {
        self.user_id.as_ref()
    }

    pub fn password(&self) -> Option<&InternationalString> {
        self.password.as_ref()
    }
}

impl Sequence for IdPass {
    const NAME: &'static str = "idPass";

    fn read_fields(reader: &mut FieldReader<'_>) -> BerResult<Self> {
        Ok(Self {
            group_id: reader.optional(Self::GROUP_ID)?,
            user_id: reader.optional(Self::USER_ID)?,
            password: reader.optional(Self::PASSWORD)?,
        })
    }

    fn write_fields(&self, writer: &mut FieldWriter) -> BerResult<()> {
        writer
            .optional(Self::GROUP_ID, self.group_id.as_ref())?
            .optional(Self::USER_ID, self.user_id.as_ref())?
            .optional(Self::PASSWORD, self.password.as_ref())?;
        Ok(())
    }
}

/// Credentials offered in an Init request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdAuthentication {
    /// `open VisibleString`, conventionally `user/password`
    Open(VisibleString),
    IdPass(IdPass),
    Anonymous,
    Other(External),
}

impl IdAuthentication {
    const ALTERNATIVES: [Tag; 4] = [Tag::VISIBLE_STRING, Tag::SEQUENCE, Tag::NULL, Tag::EXTERNAL];
}

impl BerDecode for IdAuthentication {
    fn natural_tag() -> Option<Tag> {
        None
    }

    fn decode(node: &BerNode, _check_tag: bool, config: &BerConfig) -> BerResult<Self> {
        match node.tag() {
            Tag::VISIBLE_STRING => Ok(IdAuthentication::Open(VisibleString::decode(node, true, config)?)),
            Tag::SEQUENCE => Ok(IdAuthentication::IdPass(IdPass::decode(node, true, config)?)),
            Tag::NULL => {
                Null::decode(node, true, config)?;
                Ok(IdAuthentication::Anonymous)
            }
            Tag::EXTERNAL => Ok(IdAuthentication::Other(External::decode(node, true, config)?)),
            other => Err(BerError::no_alternative("idAuthentication", &Self::ALTERNATIVES, other)),
        }
    }
}

impl BerEncode for IdAuthentication {
    const IMPLICIT_TAGGABLE: bool = false;

    fn encode(&self) -> BerResult<BerNode> {
        match self {
            IdAuthentication::Open(text) => text.encode(),
            IdAuthentication::IdPass(id_pass) => id_pass.encode(),
            IdAuthentication::Anonymous => Null.encode(),
            IdAuthentication::Other(external) => external.encode(),
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CloseReason::Finished => "finished",
            CloseReason::Shutdown => "shutdown",
            CloseReason::SystemProblem => "systemProblem",
            CloseReason::CostLimit => "costLimit",
            CloseReason::Resources => "resources",
            CloseReason::SecurityViolation => "securityViolation",
            CloseReason::ProtocolError => "protocolError",
            CloseReason::LackOfActivity => "lackOfActivity",
            CloseReason::PeerAbort => "peerAbort",
            CloseReason::Unspecified => "unspecified",
        };
        f.write_str(name)
    }
}

sequence_value!(External, InfoCategory, OtherInformationUnit, IdPass);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::{from_ber, to_ber};
    use bytes::Bytes;

    fn config() -> BerConfig {
        BerConfig::default()
    }

    fn usmarc() -> ObjectIdentifier {
        ObjectIdentifier::from_slice(crate::apdu::USMARC).unwrap()
    }

    #[test]
    fn test_reference_id_encoding() {
        let reference = ReferenceId::new("q1");
        assert_eq!(to_ber(&reference).unwrap(), vec![0x82, 0x02, b'q', b'1']);
        assert_eq!(
            from_ber::<ReferenceId>(&[0x82, 0x02, b'q', b'1'], &config()).unwrap(),
            reference
        );
        assert!(from_ber::<ReferenceId>(&[0x04, 0x02, b'q', b'1'], &config()).is_err());
    }

    #[test]
    fn test_other_information_tag() {
        let info = OtherInformation::new(vec![OtherInformationUnit::new(Information::CharacterInfo(
            InternationalString::from("x"),
        ))]);
        let bytes = to_ber(&info).unwrap();
        // [201] constructed, SEQUENCE, [2] "x"
        assert_eq!(bytes, vec![0xBF, 0x81, 0x49, 0x05, 0x30, 0x03, 0x82, 0x01, b'x']);
        assert_eq!(from_ber::<OtherInformation>(&bytes, &config()).unwrap(), info);
    }

    #[test]
    fn test_other_information_round_trip() {
        let info = OtherInformation::new(vec![
            OtherInformationUnit::new(Information::Oid(usmarc()))
                .with_category(InfoCategory::new(3).with_category_type_id(usmarc())),
            OtherInformationUnit::new(Information::BinaryInfo(OctetString::from(vec![0u8, 1, 2]))),
            OtherInformationUnit::new(Information::ExternallyDefinedInfo(External::with_octets(
                usmarc(),
                vec![0x30u8, 0x31],
            ))),
        ]);
        let bytes = to_ber(&info).unwrap();
        let decoded = from_ber::<OtherInformation>(&bytes, &config()).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(decoded.units()[0].category().map(InfoCategory::category_value), Some(3));
    }

    #[test]
    fn test_information_unknown_alternative() {
        let unit = BerNode::constructed(
            Tag::SEQUENCE,
            vec![BerNode::primitive(Tag::context(9), Bytes::new())],
        );
        match OtherInformationUnit::decode(&unit, true, &config()) {
            Err(BerError::UnexpectedTag { field, expected, found }) => {
                assert_eq!(field, "information");
                assert_eq!(expected.len(), 4);
                assert_eq!(found, Tag::context(9));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_external_forms() {
        let asn1 = External::with_asn1(usmarc(), BerNode::primitive(Tag::INTEGER, vec![0x2Au8]))
            .with_indirect_reference(4)
            .with_data_value_descriptor("marc");
        let octets = External::with_octets(usmarc(), b"record".to_vec());
        let bits = External::new(ExternalEncoding::Arbitrary(BitString::from_bits(&[true, false])));

        for external in [asn1, octets, bits] {
            let bytes = to_ber(&external).unwrap();
            assert_eq!(bytes[0], 0x28);
            assert_eq!(from_ber::<External>(&bytes, &config()).unwrap(), external);
        }
    }

    #[test]
    fn test_external_single_asn1_type_is_explicit() {
        let external = External::new(ExternalEncoding::SingleAsn1Type(BerNode::primitive(
            Tag::BOOLEAN,
            vec![0xFF],
        )));
        assert_eq!(
            to_ber(&external).unwrap(),
            vec![0x28, 0x05, 0xA0, 0x03, 0x01, 0x01, 0xFF]
        );
    }

    #[test]
    fn test_external_requires_encoding() {
        // EXTERNAL holding only a direct-reference
        let data = [0x28, 0x03, 0x06, 0x01, 0x2A];
        assert_eq!(
            from_ber::<External>(&data, &config()).unwrap_err(),
            BerError::Incomplete { field: "encoding" }
        );
    }

    #[test]
    fn test_id_authentication_alternatives() {
        let values = [
            IdAuthentication::Open(VisibleString::from("user/secret")),
            IdAuthentication::IdPass(IdPass::new("user", "secret").with_group_id("staff")),
            IdAuthentication::IdPass(IdPass::default()),
            IdAuthentication::Anonymous,
            IdAuthentication::Other(External::with_octets(usmarc(), vec![1u8])),
        ];
        for value in values {
            let bytes = to_ber(&value).unwrap();
            assert_eq!(from_ber::<IdAuthentication>(&bytes, &config()).unwrap(), value);
        }
        assert!(matches!(
            from_ber::<IdAuthentication>(&[0x02, 0x01, 0x00], &config()),
            Err(BerError::UnexpectedTag { .. })
        ));
    }

    #[test]
    fn test_choice_rejects_implicit_tagging() {
        use crate::ber::{from_ber_tagged, to_ber_tagged};

        let implicit = Tagging::Implicit(Tag::context(7));
        assert!(matches!(
            to_ber_tagged(&IdAuthentication::Anonymous, implicit),
            Err(BerError::MalformedTag(_))
        ));
        assert!(
            to_ber_tagged(&Information::Oid(usmarc()), Tagging::Implicit(Tag::context(1))).is_err()
        );
        assert!(
            to_ber_tagged(
                &ExternalEncoding::OctetAligned(OctetString::from("x")),
                Tagging::Implicit(Tag::context(1))
            )
            .is_err()
        );

        // EXPLICIT keeps the alternative's tag inside the wrapper
        let explicit = Tagging::Explicit(Tag::context(7));
        let bytes = to_ber_tagged(&IdAuthentication::Anonymous, explicit).unwrap();
        assert_eq!(bytes, vec![0xA7, 0x02, 0x05, 0x00]);
        assert_eq!(
            from_ber_tagged::<IdAuthentication>(&bytes, explicit, &config()).unwrap(),
            IdAuthentication::Anonymous
        );
    }

    #[test]
    fn test_implicit_choice_field_fails_to_encode() {
        let mut writer = FieldWriter::new();
        assert!(
            writer
                .mandatory(Field::implicit("auth", 7), &IdAuthentication::Anonymous)
                .is_err()
        );
        assert!(writer.into_node(Tag::SEQUENCE).children().unwrap().is_empty());
    }

    #[test]
    fn test_named_integers() {
        assert_eq!(CloseReason::from_value(6).unwrap(), CloseReason::ProtocolError);
        assert_eq!(CloseReason::PeerAbort.value(), 8);
        assert_eq!(CloseReason::LackOfActivity.to_string(), "lackOfActivity");
        assert!(matches!(
            CloseReason::from_value(10),
            Err(BerError::MalformedValue { kind: "CloseReason", .. })
        ));
        assert_eq!(to_ber(&DeleteFunction::All).unwrap(), vec![0x02, 0x01, 0x01]);
    }

    #[test]
    fn test_option_bits() {
        let options = InitOption::bits(&[InitOption::Search, InitOption::Present, InitOption::Scan]);
        assert_eq!(options.num_bits(), 8);
        assert_eq!(options.as_bytes(), &[0xC1]);
        assert!(InitOption::is_set(&options, InitOption::Scan));
        assert!(!InitOption::is_set(&options, InitOption::Sort));

        let versions = ProtocolVersion::bits(&[ProtocolVersion::Version2, ProtocolVersion::Version3]);
        assert_eq!(versions.as_bytes(), &[0x60]);
        assert_eq!(versions.unused_bits(), 5);
    }
}
