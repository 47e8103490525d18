use super::{DnskeyData, DsData, RecordData, RrsigData};
use crate::DomainName;
use std::net::IpAddr;

/// A decoded resource record (class IN is implied).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub owner: DomainName,
    pub ttl: u32,
    pub data: RecordData,
}

impl ResourceRecord {
    pub fn new(owner: DomainName, ttl: u32, data: RecordData) -> Self {
        Self { owner, ttl, data }
    }

    pub fn as_address(&self) -> Option<IpAddr> {
        match &self.data {
            RecordData::Address(ip) => Some(*ip),
            _ => None,
        }
    }

    pub fn as_ns(&self) -> Option<&DomainName> {
        match &self.data {
            RecordData::Ns(target) => Some(target),
            _ => None,
        }
    }

    pub fn as_ds(&self) -> Option<&DsData> {
        match &self.data {
            RecordData::Ds(ds) => Some(ds),
            _ => None,
        }
    }

    pub fn as_cds(&self) -> Option<&DsData> {
        match &self.data {
            RecordData::Cds(cds) => Some(cds),
            _ => None,
        }
    }

    pub fn as_dnskey(&self) -> Option<&DnskeyData> {
        match &self.data {
            RecordData::Dnskey(key) => Some(key),
            _ => None,
        }
    }

    pub fn as_rrsig(&self) -> Option<&RrsigData> {
        match &self.data {
            RecordData::Rrsig(sig) => Some(sig),
            _ => None,
        }
    }
}
