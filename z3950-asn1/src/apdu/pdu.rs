//! Z39.50 APDU structures
//!
//! This module provides a subset of the Z39.50-1995 APDUs:
//! - InitializeRequest / InitializeResponse (tags 20 / 21)
//! - DeleteResultSetRequest (tag 26)
//! - Close (tag 48)
//!
//! # Field Encoding Order
//!
//! Fields are encoded in schema order. Every PDU starts with an optional
//! `referenceId` and ends with an optional `otherInfo`; both are untagged
//! at the field level and are decoded speculatively.

use z3950_core::{BitString, ObjectIdentifier};

use crate::ber::{
    BerConfig, BerDecode, BerEncode, BerNode, Field, FieldReader, FieldWriter,
    InternationalString, Sequence, Tag, Tagging,
};
use crate::error::{BerError, BerResult};
use crate::sequence_value;

use super::types::*;

const REFERENCE_ID: Field = Field::untagged("referenceId");
const OTHER_INFO: Field = Field::untagged("otherInfo");
const PROTOCOL_VERSION: Field = Field::implicit("protocolVersion", 3);
const OPTIONS: Field = Field::implicit("options", 4);
const PREFERRED_MESSAGE_SIZE: Field = Field::implicit("preferredMessageSize", 5);
const EXCEPTIONAL_RECORD_SIZE: Field = Field::implicit("exceptionalRecordSize", 6);
const IMPLEMENTATION_ID: Field = Field::implicit("implementationId", 110);
const IMPLEMENTATION_NAME: Field = Field::implicit("implementationName", 111);
const IMPLEMENTATION_VERSION: Field = Field::implicit("implementationVersion", 112);
const USER_INFORMATION_FIELD: Field = Field::explicit("userInformationField", 11);

/// Implementation identification common to Init request and response
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Implementation {
    id: Option<InternationalString>,
    name: Option<InternationalString>,
    version: Option<InternationalString>,
}

impl Implementation {
    pub fn new(
        id: impl Into<InternationalString>,
        name: impl Into<InternationalString>,
        version: impl Into<InternationalString>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            version: Some(version.into()),
        }
    }

    pub fn id(&self) -> Option<&InternationalString> {
        self.id.as_ref()
    }

    pub fn name(&self) -> Option<&InternationalString> {
        self.name.as_ref()
    }

    pub fn version(&self) -> Option<&InternationalString> {
        self.version.as_ref()
    }

    fn read(reader: &mut FieldReader<'_>) -> BerResult<Self> {
        Ok(Self {
            id: reader.optional(IMPLEMENTATION_ID)?,
            name: reader.optional(IMPLEMENTATION_NAME)?,
            version: reader.optional(IMPLEMENTATION_VERSION)?,
        })
    }

    fn write(&self, writer: &mut FieldWriter) -> BerResult<()> {
        writer
            .optional(IMPLEMENTATION_ID, self.id.as_ref())?
            .optional(IMPLEMENTATION_NAME, self.name.as_ref())?
            .optional(IMPLEMENTATION_VERSION, self.version.as_ref())?;
        Ok(())
    }
}

/// Init request sent by the origin to open a Z-association
///
/// # Structure
/// - referenceId (optional, speculative)
/// - Tag 3: protocolVersion BIT STRING
/// - Tag 4: options BIT STRING
/// - Tag 5: preferredMessageSize INTEGER
/// - Tag 6: exceptionalRecordSize INTEGER
/// - Tag 7: idAuthentication (optional, EXPLICIT CHOICE)
/// - Tags 110-112: implementation id, name, version (optional)
/// - Tag 11: userInformationField (optional, EXPLICIT EXTERNAL)
/// - otherInfo (optional, speculative)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeRequest {
    reference_id: Option<ReferenceId>,
    protocol_version: BitString,
    options: BitString,
    preferred_message_size: i64,
    exceptional_record_size: i64,
    id_authentication: Option<IdAuthentication>,
    implementation: Implementation,
    user_information_field: Option<External>,
    other_info: Option<OtherInformation>,
}

impl InitializeRequest {
    const ID_AUTHENTICATION: Field = Field::explicit("idAuthentication", 7);

    /// Create a new Init request with the mandatory fields
    ///
    /// # Arguments
    /// * `protocol_version` - Supported versions, see [`ProtocolVersion::bits`]
    /// * `options` - Requested services, see [`InitOption::bits`]
    /// * `preferred_message_size` - Preferred APDU size in bytes
    /// * `exceptional_record_size` - Largest single record the origin accepts
    pub fn new(
        protocol_version: BitString,
        options: BitString,
        preferred_message_size: i64,
        exceptional_record_size: i64,
    ) -> Self {
        Self {
            reference_id: None,
            protocol_version,
            options,
            preferred_message_size,
            exceptional_record_size,
            id_authentication: None,
            implementation: Implementation::default(),
            user_information_field: None,
            other_info: None,
        }
    }

    pub fn with_reference_id(mut self, reference_id: ReferenceId) -> Self {
        self.reference_id = Some(reference_id);
        self
    }

    pub fn with_id_authentication(mut self, id_authentication: IdAuthentication) -> Self {
        self.id_authentication = Some(id_authentication);
        self
    }

    pub fn with_implementation(mut self, implementation: Implementation) -> Self {
        self.implementation = implementation;
        self
    }

    pub fn with_user_information_field(mut self, external: External) -> Self {
        self.user_information_field = Some(external);
        self
    }

    pub fn with_other_info(mut self, other_info: OtherInformation) -> Self {
        self.other_info = Some(other_info);
        self
    }

    pub fn reference_id(&self) -> Option<&ReferenceId> {
        self.reference_id.as_ref()
    }

    pub fn protocol_version(&self) -> &BitString {
        &self.protocol_version
    }

    pub fn options(&self) -> &BitString {
        &self.options
    }

    pub fn preferred_message_size(&self) -> i64 {
        self.preferred_message_size
    }

    pub fn exceptional_record_size(&self) -> i64 {
        self.exceptional_record_size
    }

    pub fn id_authentication(&self) -> Option<&IdAuthentication> {
        self.id_authentication.as_ref()
    }

    pub fn implementation(&self) -> &Implementation {
        &self.implementation
    }

    pub fn user_information_field(&self) -> Option<&External> {
        self.user_information_field.as_ref()
    }

    pub fn other_info(&self) -> Option<&OtherInformation> {
        self.other_info.as_ref()
    }
}

impl Sequence for InitializeRequest {
    const NAME: &'static str = "InitializeRequest";

    fn read_fields(reader: &mut FieldReader<'_>) -> BerResult<Self> {
        Ok(Self {
            reference_id: reader.optional(REFERENCE_ID)?,
            protocol_version: reader.mandatory(PROTOCOL_VERSION)?,
            options: reader.mandatory(OPTIONS)?,
            preferred_message_size: reader.mandatory(PREFERRED_MESSAGE_SIZE)?,
            exceptional_record_size: reader.mandatory(EXCEPTIONAL_RECORD_SIZE)?,
            id_authentication: reader.optional(Self::ID_AUTHENTICATION)?,
            implementation: Implementation::read(reader)?,
            user_information_field: reader.optional(USER_INFORMATION_FIELD)?,
            other_info: reader.optional(OTHER_INFO)?,
        })
    }

    fn write_fields(&self, writer: &mut FieldWriter) -> BerResult<()> {
        writer
            .optional(REFERENCE_ID, self.reference_id.as_ref())?
            .mandatory(PROTOCOL_VERSION, &self.protocol_version)?
            .mandatory(OPTIONS, &self.options)?
            .mandatory(PREFERRED_MESSAGE_SIZE, &self.preferred_message_size)?
            .mandatory(EXCEPTIONAL_RECORD_SIZE, &self.exceptional_record_size)?
            .optional(Self::ID_AUTHENTICATION, self.id_authentication.as_ref())?;
        self.implementation.write(writer)?;
        writer
            .optional(USER_INFORMATION_FIELD, self.user_information_field.as_ref())?
            .optional(OTHER_INFO, self.other_info.as_ref())?;
        Ok(())
    }
}

/// Init response returned by the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeResponse {
    reference_id: Option<ReferenceId>,
    protocol_version: BitString,
    options: BitString,
    preferred_message_size: i64,
    exceptional_record_size: i64,
    result: bool,
    implementation: Implementation,
    user_information_field: Option<External>,
    other_info: Option<OtherInformation>,
}

impl InitializeResponse {
    const RESULT: Field = Field::implicit("result", 12);

    pub fn new(
        protocol_version: BitString,
        options: BitString,
        preferred_message_size: i64,
        exceptional_record_size: i64,
        result: bool,
    ) -> Self {
        Self {
            reference_id: None,
            protocol_version,
            options,
            preferred_message_size,
            exceptional_record_size,
            result,
            implementation: Implementation::default(),
            user_information_field: None,
            other_info: None,
        }
    }

    /// Response answering `request`, echoing its referenceId
    pub fn answering(request: &InitializeRequest, options: BitString, result: bool) -> Self {
        let mut response = Self::new(
            request.protocol_version.clone(),
            options,
            request.preferred_message_size,
            request.exceptional_record_size,
            result,
        );
        response.reference_id = request.reference_id.clone();
        response
    }

    pub fn with_reference_id(mut self, reference_id: ReferenceId) -> Self {
        self.reference_id = Some(reference_id);
        self
    }

    pub fn with_implementation(mut self, implementation: Implementation) -> Self {
        self.implementation = implementation;
        self
    }

    pub fn with_user_information_field(mut self, external: External) -> Self {
        self.user_information_field = Some(external);
        self
    }

    pub fn with_other_info(mut self, other_info: OtherInformation) -> Self {
        self.other_info = Some(other_info);
        self
    }

    pub fn reference_id(&self) -> Option<&ReferenceId> {
        self.reference_id.as_ref()
    }

    pub fn protocol_version(&self) -> &BitString {
        &self.protocol_version
    }

    pub fn options(&self) -> &BitString {
        &self.options
    }

    pub fn preferred_message_size(&self) -> i64 {
        self.preferred_message_size
    }

    pub fn exceptional_record_size(&self) -> i64 {
        self.exceptional_record_size
    }

    /// Whether the target accepted the association
    pub fn result(&self) -> bool {
        self.result
    }

    pub fn implementation(&self) -> &Implementation {
        &self.implementation
    }

    pub fn user_information_field(&self) -> Option<&External> {
        self.user_information_field.as_ref()
    }

    pub fn other_info(&self) -> Option<&OtherInformation> {
        self.other_info.as_ref()
    }
}

impl Sequence for InitializeResponse {
    const NAME: &'static str = "InitializeResponse";

    fn read_fields(reader: &mut FieldReader<'_>) -> BerResult<Self> {
        Ok(Self {
            reference_id: reader.optional(REFERENCE_ID)?,
            protocol_version: reader.mandatory(PROTOCOL_VERSION)?,
            options: reader.mandatory(OPTIONS)?,
            preferred_message_size: reader.mandatory(PREFERRED_MESSAGE_SIZE)?,
            exceptional_record_size: reader.mandatory(EXCEPTIONAL_RECORD_SIZE)?,
            result: reader.mandatory(Self::RESULT)?,
            implementation: Implementation::read(reader)?,
            user_information_field: reader.optional(USER_INFORMATION_FIELD)?,
            other_info: reader.optional(OTHER_INFO)?,
        })
    }

    fn write_fields(&self, writer: &mut FieldWriter) -> BerResult<()> {
        writer
            .optional(REFERENCE_ID, self.reference_id.as_ref())?
            .mandatory(PROTOCOL_VERSION, &self.protocol_version)?
            .mandatory(OPTIONS, &self.options)?
            .mandatory(PREFERRED_MESSAGE_SIZE, &self.preferred_message_size)?
            .mandatory(EXCEPTIONAL_RECORD_SIZE, &self.exceptional_record_size)?
            .mandatory(Self::RESULT, &self.result)?;
        self.implementation.write(writer)?;
        writer
            .optional(USER_INFORMATION_FIELD, self.user_information_field.as_ref())?
            .optional(OTHER_INFO, self.other_info.as_ref())?;
        Ok(())
    }
}

/// Request to delete result sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResultSetRequest {
    reference_id: Option<ReferenceId>,
    delete_function: DeleteFunction,
    result_set_list: Option<Vec<ResultSetId>>,
    other_info: Option<OtherInformation>,
}

impl DeleteResultSetRequest {
    const DELETE_FUNCTION: Field = Field::implicit("deleteFunction", 32);
    const RESULT_SET_LIST: Field = Field::untagged("resultSetList");

    /// Delete every result set of the association
    pub fn all() -> Self {
        Self {
            reference_id: None,
            delete_function: DeleteFunction::All,
            result_set_list: None,
            other_info: None,
        }
    }

    /// Delete the named result sets
    pub fn list(result_sets: Vec<ResultSetId>) -> Self {
        Self {
            reference_id: None,
            delete_function: DeleteFunction::List,
            result_set_list: Some(result_sets),
            other_info: None,
        }
    }

    pub fn with_reference_id(mut self, reference_id: ReferenceId) -> Self {
        self.reference_id = Some(reference_id);
        self
    }

    pub fn with_other_info(mut self, other_info: OtherInformation) -> Self {
        self.other_info = Some(other_info);
        self
    }

    pub fn reference_id(&self) -> Option<&ReferenceId> {
        self.reference_id.as_ref()
    }

    pub fn delete_function(&self) -> DeleteFunction {
        self.delete_function
    }

    /// `None` when the list is absent, distinct from an empty list
    pub fn result_set_list(&self) -> Option<&[ResultSetId]> {
        self.result_set_list.as_deref()
    }

    pub fn other_info(&self) -> Option<&OtherInformation> {
        self.other_info.as_ref()
    }
}

impl Sequence for DeleteResultSetRequest {
    const NAME: &'static str = "DeleteResultSetRequest";

    fn read_fields(reader: &mut FieldReader<'_>) -> BerResult<Self> {
        Ok(Self {
            reference_id: reader.optional(REFERENCE_ID)?,
            delete_function: reader.mandatory(Self::DELETE_FUNCTION)?,
            result_set_list: reader.repeated(Self::RESULT_SET_LIST)?,
            other_info: reader.optional(OTHER_INFO)?,
        })
    }

    fn write_fields(&self, writer: &mut FieldWriter) -> BerResult<()> {
        writer
            .optional(REFERENCE_ID, self.reference_id.as_ref())?
            .mandatory(Self::DELETE_FUNCTION, &self.delete_function)?
            .repeated(Self::RESULT_SET_LIST, self.result_set_list.as_deref())?
            .optional(OTHER_INFO, self.other_info.as_ref())?;
        Ok(())
    }
}

/// Close, sent by either side to end the Z-association
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Close {
    reference_id: Option<ReferenceId>,
    close_reason: CloseReason,
    diagnostic_information: Option<InternationalString>,
    resource_report_format: Option<ObjectIdentifier>,
    resource_report: Option<External>,
    other_info: Option<OtherInformation>,
}

impl Close {
    const CLOSE_REASON: Field = Field::implicit("closeReason", 211);
    const DIAGNOSTIC_INFORMATION: Field = Field::implicit("diagnosticInformation", 3);
    const RESOURCE_REPORT_FORMAT: Field = Field::implicit("resourceReportFormat", 4);
    const RESOURCE_REPORT: Field = Field::explicit("resourceReport", 5);

    pub fn new(close_reason: CloseReason) -> Self {
        Self {
            reference_id: None,
            close_reason,
            diagnostic_information: None,
            resource_report_format: None,
            resource_report: None,
            other_info: None,
        }
    }

    pub fn with_reference_id(mut self, reference_id: ReferenceId) -> Self {
        self.reference_id = Some(reference_id);
        self
    }

    pub fn with_diagnostic_information(mut self, text: impl Into<InternationalString>) -> Self {
        self.diagnostic_information = Some(text.into());
        self
    }

    pub fn with_resource_report(mut self, format: ObjectIdentifier, report: External) -> Self {
        self.resource_report_format = Some(format);
        self.resource_report = Some(report);
        self
    }

    pub fn with_other_info(mut self, other_info: OtherInformation) -> Self {
        self.other_info = Some(other_info);
        self
    }

    pub fn reference_id(&self) -> Option<&ReferenceId> {
        self.reference_id.as_ref()
    }

    pub fn close_reason(&self) -> CloseReason {
        self.close_reason
    }

    pub fn diagnostic_information(&self) -> Option<&InternationalString> {
        self.diagnostic_information.as_ref()
    }

    pub fn resource_report_format(&self) -> Option<&ObjectIdentifier> {
        self.resource_report_format.as_ref()
    }

    pub fn resource_report(&self) -> Option<&External> {
        self.resource_report.as_ref()
    }

    pub fn other_info(&self) -> Option<&OtherInformation> {
        self.other_info.as_ref()
    }
}

impl Sequence for Close {
    const NAME: &'static str = "Close";

    fn read_fields(reader: &mut FieldReader<'_>) -> BerResult<Self> {
        Ok(Self {
            reference_id: reader.optional(REFERENCE_ID)?,
            close_reason: reader.mandatory(Self::CLOSE_REASON)?,
            diagnostic_information: reader.optional(Self::DIAGNOSTIC_INFORMATION)?,
            resource_report_format: reader.optional(Self::RESOURCE_REPORT_FORMAT)?,
            resource_report: reader.optional(Self::RESOURCE_REPORT)?,
            other_info: reader.optional(OTHER_INFO)?,
        })
    }

    fn write_fields(&self, writer: &mut FieldWriter) -> BerResult<()> {
        writer
            .optional(REFERENCE_ID, self.reference_id.as_ref())?
            .mandatory(Self::CLOSE_REASON, &self.close_reason)?
            .optional(Self::DIAGNOSTIC_INFORMATION, self.diagnostic_information.as_ref())?
            .optional(Self::RESOURCE_REPORT_FORMAT, self.resource_report_format.as_ref())?
            .optional(Self::RESOURCE_REPORT, self.resource_report.as_ref())?
            .optional(OTHER_INFO, self.other_info.as_ref())?;
        Ok(())
    }
}

sequence_value!(InitializeRequest, InitializeResponse, DeleteResultSetRequest, Close);

/// Top-level Z39.50 PDU
///
/// Every alternative is `[n] IMPLICIT`, so the outer tag alone selects the
/// APDU type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Apdu {
    InitRequest(InitializeRequest),
    InitResponse(InitializeResponse),
    DeleteResultSetRequest(DeleteResultSetRequest),
    Close(Close),
}

impl Apdu {
    pub const INIT_REQUEST: Tag = Tag::context(20);
    pub const INIT_RESPONSE: Tag = Tag::context(21);
    pub const DELETE_RESULT_SET_REQUEST: Tag = Tag::context(26);
    pub const CLOSE: Tag = Tag::context(48);
    const ALTERNATIVES: [Tag; 4] = [
        Self::INIT_REQUEST,
        Self::INIT_RESPONSE,
        Self::DELETE_RESULT_SET_REQUEST,
        Self::CLOSE,
    ];

    /// Outer tag of this APDU
    pub fn tag(&self) -> Tag {
        match self {
            Apdu::InitRequest(_) => Self::INIT_REQUEST,
            Apdu::InitResponse(_) => Self::INIT_RESPONSE,
            Apdu::DeleteResultSetRequest(_) => Self::DELETE_RESULT_SET_REQUEST,
            Apdu::Close(_) => Self::CLOSE,
        }
    }

    /// ASN.1 name of the chosen alternative
    pub fn name(&self) -> &'static str {
        match self {
            Apdu::InitRequest(_) => InitializeRequest::NAME,
            Apdu::InitResponse(_) => InitializeResponse::NAME,
            Apdu::DeleteResultSetRequest(_) => DeleteResultSetRequest::NAME,
            Apdu::Close(_) => Close::NAME,
        }
    }

    pub fn reference_id(&self) -> Option<&ReferenceId> {
        match self {
            Apdu::InitRequest(pdu) => pdu.reference_id(),
            Apdu::InitResponse(pdu) => pdu.reference_id(),
            Apdu::DeleteResultSetRequest(pdu) => pdu.reference_id(),
            Apdu::Close(pdu) => pdu.reference_id(),
        }
    }
}

impl BerDecode for Apdu {
    fn natural_tag() -> Option<Tag> {
        None
    }

    fn decode(node: &BerNode, _check_tag: bool, config: &BerConfig) -> BerResult<Self> {
        let apdu = match node.tag() {
            Self::INIT_REQUEST => Apdu::InitRequest(InitializeRequest::decode(node, false, config)?),
            Self::INIT_RESPONSE => Apdu::InitResponse(InitializeResponse::decode(node, false, config)?),
            Self::DELETE_RESULT_SET_REQUEST => {
                Apdu::DeleteResultSetRequest(DeleteResultSetRequest::decode(node, false, config)?)
            }
            Self::CLOSE => Apdu::Close(Close::decode(node, false, config)?),
            other => return Err(BerError::no_alternative("PDU", &Self::ALTERNATIVES, other)),
        };
        log::trace!("decoded {} APDU", apdu.name());
        Ok(apdu)
    }
}

impl BerEncode for Apdu {
    const IMPLICIT_TAGGABLE: bool = false;

    fn encode(&self) -> BerResult<BerNode> {
        let tagging = Tagging::Implicit(self.tag());
        match self {
            Apdu::InitRequest(pdu) => pdu.encode_tagged(tagging),
            Apdu::InitResponse(pdu) => pdu.encode_tagged(tagging),
            Apdu::DeleteResultSetRequest(pdu) => pdu.encode_tagged(tagging),
            Apdu::Close(pdu) => pdu.encode_tagged(tagging),
        }
    }
}

impl From<InitializeRequest> for Apdu {
    fn from(pdu: InitializeRequest) -> Self {
        Apdu::InitRequest(pdu)
    }
}

impl From<InitializeResponse> for Apdu {
    fn from(pdu: InitializeResponse) -> Self {
        Apdu::InitResponse(pdu)
    }
}

impl From<DeleteResultSetRequest> for Apdu {
    fn from(pdu: DeleteResultSetRequest) -> Self {
        Apdu::DeleteResultSetRequest(pdu)
    }
}

impl From<Close> for Apdu {
    fn from(pdu: Close) -> Self {
        Apdu::Close(pdu)
    }
}
