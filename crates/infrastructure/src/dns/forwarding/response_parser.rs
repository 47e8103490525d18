use dsboot_application::ports::DnsAnswer;
use super::record_type_map::RecordTypeMapper;
use dsboot_domain::{DomainError, DomainName, RecordData, ResourceRecord};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::Record;
use hickory_proto::serialize::binary::BinEncodable;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub id: u16,

    pub rcode: ResponseCode,

    pub truncated: bool,

    /// AD bit as set by the validating resolver
    pub authenticated: bool,

    pub answers: Vec<ResourceRecord>,

    pub authority: Vec<ResourceRecord>,
}

impl DnsResponse {
    pub fn is_nxdomain(&self) -> bool {
        self.rcode == ResponseCode::NXDomain
    }

    pub fn is_server_failure(&self) -> bool {
        self.rcode == ResponseCode::ServFail
    }

    /// Any rcode that is neither an answer nor an authoritative denial.
    pub fn is_error(&self) -> bool {
        !matches!(self.rcode, ResponseCode::NoError | ResponseCode::NXDomain)
    }

    pub fn into_answer(self) -> DnsAnswer {
        DnsAnswer {
            nxdomain: self.is_nxdomain(),
            ..DnsAnswer::new(self.answers, self.authenticated)
        }
        .with_authority(self.authority)
    }
}

pub struct ResponseParser;

impl ResponseParser {
    pub fn parse(response_bytes: &[u8]) -> Result<DnsResponse, DomainError> {
        let message = Message::from_vec(response_bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to parse DNS response: {}", e))
        })?;

        let answers: Vec<ResourceRecord> =
            message.answers.iter().filter_map(Self::convert).collect();
        let authority: Vec<ResourceRecord> = message
            .authorities
            .iter()
            .filter_map(Self::convert)
            .collect();

        let response = DnsResponse {
            id: message.id,
            rcode: message.response_code,
            truncated: message.truncation,
            authenticated: message.authentic_data,
            answers,
            authority,
        };

        debug!(
            rcode = ?response.rcode,
            answers = response.answers.len(),
            authority = response.authority.len(),
            authenticated = response.authenticated,
            truncated = response.truncated,
            "DNS response parsed"
        );

        Ok(response)
    }

    /// Re-encodes the hickory record data and decodes it into the domain
    /// model. Records that cannot be represented are dropped.
    fn convert(record: &Record) -> Option<ResourceRecord> {
        // OPT and other unmodelled types never reach the domain
        RecordTypeMapper::from_hickory(record.record_type())?;

        let owner = match DomainName::from_wire_labels(record.name.iter()) {
            Ok(owner) => owner,
            Err(e) => {
                debug!(error = %e, "Skipping record with unsupported owner name");
                return None;
            }
        };
        let type_code = u16::from(record.record_type());

        let rdata = match record.data.to_bytes() {
            Ok(rdata) => rdata,
            Err(e) => {
                debug!(owner = %owner, type_code, error = %e, "Failed to encode record data");
                return None;
            }
        };

        match RecordData::from_wire(type_code, &rdata) {
            Ok(data) => Some(ResourceRecord::new(owner, record.ttl, data)),
            Err(e) => {
                debug!(owner = %owner, type_code, error = %e, "Skipping undecodable record");
                None
            }
        }
    }
}
