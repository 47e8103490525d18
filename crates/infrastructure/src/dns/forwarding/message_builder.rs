//! DNS Message Builder
//!
//! Constructs DNSSEC-aware query messages in wire format using
//! `hickory-proto`.

use super::record_type_map::RecordTypeMapper;
use dsboot_domain::{DnsQuery, DomainError};
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_proto::rr::Name;

/// Header and EDNS settings of an outgoing query.
#[derive(Debug, Clone, Copy)]
pub struct QueryFlags {
    /// Advertised EDNS(0) UDP payload size
    pub edns_payload: u16,
    /// Set CD to get the answer even if validation fails
    pub checking_disabled: bool,
    /// Cleared when asking an authoritative server directly
    pub recursion_desired: bool,
}

impl QueryFlags {
    /// Flags for a non-recursive query sent straight to an authoritative server.
    pub fn authoritative(edns_payload: u16) -> Self {
        Self {
            edns_payload,
            checking_disabled: false,
            recursion_desired: false,
        }
    }
}

impl Default for QueryFlags {
    fn default() -> Self {
        Self {
            edns_payload: 1232,
            checking_disabled: false,
            recursion_desired: true,
        }
    }
}

/// Builds DNS query messages in wire format
pub struct MessageBuilder;

impl MessageBuilder {
    /// Build a query with the DO and AD bits set and return the message ID
    /// together with the serialized bytes.
    pub fn build_query(query: &DnsQuery, flags: QueryFlags) -> Result<(u16, Vec<u8>), DomainError> {
        let name = Name::from_labels(query.name.wire_labels()).map_err(|e| {
            DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", query.name, e))
        })?;

        let question = Query::query(name, RecordTypeMapper::to_hickory(query.record_type));

        let id = fastrand::u16(..);

        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.metadata.recursion_desired = flags.recursion_desired;
        message.metadata.authentic_data = true;
        message.metadata.checking_disabled = flags.checking_disabled;
        message.add_query(question);

        let mut edns = Edns::new();
        edns.set_max_payload(flags.edns_payload);
        edns.enable_dnssec();
        message.set_edns(edns);

        let bytes = message.to_vec().map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to serialize DNS message: {}", e))
        })?;
        Ok((id, bytes))
    }
}
