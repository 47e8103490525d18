//! Typed RDATA for the record types the pipeline reasons about, decoded
//! from uncompressed wire form (RFC 4034, RFC 7344).

use super::RecordType;
use crate::{DomainError, DomainName};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// DS / CDS RDATA. The two types share a layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DsData {
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    pub digest: Vec<u8>,
}

impl DsData {
    pub fn new(key_tag: u16, algorithm: u8, digest_type: u8, digest: Vec<u8>) -> Self {
        Self {
            key_tag,
            algorithm,
            digest_type,
            digest,
        }
    }

    /// RFC 8078 section 4 delete request (`0 0 0 00`).
    pub fn is_delete(&self) -> bool {
        self.algorithm == 0
    }

    pub fn digest_hex(&self) -> String {
        self.digest.iter().map(|b| format!("{:02X}", b)).collect()
    }
}

/// DNSKEY / CDNSKEY RDATA.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DnskeyData {
    pub flags: u16,
    pub protocol: u8,
    pub algorithm: u8,
    pub public_key: Vec<u8>,
}

impl DnskeyData {
    const ZONE_KEY: u16 = 0x0100;
    const REVOKE: u16 = 0x0080;

    pub fn new(flags: u16, algorithm: u8, public_key: Vec<u8>) -> Self {
        Self {
            flags,
            protocol: 3,
            algorithm,
            public_key,
        }
    }

    pub fn is_zone_key(&self) -> bool {
        self.flags & Self::ZONE_KEY != 0
    }

    pub fn is_revoked(&self) -> bool {
        self.flags & Self::REVOKE != 0
    }

    pub fn to_wire(&self) -> Vec<u8> {
        let mut wire = Vec::with_capacity(4 + self.public_key.len());
        wire.extend_from_slice(&self.flags.to_be_bytes());
        wire.push(self.protocol);
        wire.push(self.algorithm);
        wire.extend_from_slice(&self.public_key);
        wire
    }

    /// Key tag per RFC 4034 appendix B.
    pub fn key_tag(&self) -> u16 {
        let wire = self.to_wire();
        let mut acc: u32 = 0;
        for (i, byte) in wire.iter().enumerate() {
            if i & 1 == 0 {
                acc += u32::from(*byte) << 8;
            } else {
                acc += u32::from(*byte);
            }
        }
        acc += (acc >> 16) & 0xFFFF;
        (acc & 0xFFFF) as u16
    }
}

/// RRSIG RDATA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrsigData {
    pub type_covered: u16,
    pub algorithm: u8,
    pub labels: u8,
    pub original_ttl: u32,
    pub expiration: u32,
    pub inception: u32,
    pub key_tag: u16,
    pub signer: DomainName,
    pub signature: Vec<u8>,
}

impl RrsigData {
    pub fn covers(&self, record_type: RecordType) -> bool {
        self.type_covered == record_type.to_u16()
    }

    /// RRSIG RDATA without the signature field, the prefix of the signed
    /// data (RFC 4034 section 3.1.8.1).
    pub fn signed_prefix(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(18 + self.signer.as_str().len() + 1);
        data.extend_from_slice(&self.type_covered.to_be_bytes());
        data.push(self.algorithm);
        data.push(self.labels);
        data.extend_from_slice(&self.original_ttl.to_be_bytes());
        data.extend_from_slice(&self.expiration.to_be_bytes());
        data.extend_from_slice(&self.inception.to_be_bytes());
        data.extend_from_slice(&self.key_tag.to_be_bytes());
        data.extend_from_slice(&self.signer.to_wire());
        data
    }

    /// RRSIG time of `unix_secs`: the seconds since the epoch modulo 2^32
    /// (RFC 4034 section 3.1.5). Timestamps past 2106 wrap around and are
    /// still ordered correctly by `is_current`.
    pub fn serial_time(unix_secs: u64) -> u32 {
        const SERIAL_MODULUS: u64 = 1 << 32;
        // lossless: the remainder is below 2^32
        (unix_secs % SERIAL_MODULUS) as u32
    }

    /// Validity window check using RFC 1982 serial arithmetic.
    pub fn is_current(&self, now: u32) -> bool {
        let after_inception = now.wrapping_sub(self.inception) < 0x8000_0000;
        let before_expiration = self.expiration.wrapping_sub(now) < 0x8000_0000;
        after_inception && before_expiration
    }
}

/// NSEC RDATA. The type bitmap is kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NsecData {
    pub next: DomainName,
    pub type_bitmaps: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    /// A or AAAA
    Address(IpAddr),
    Ns(DomainName),
    Ds(DsData),
    Cds(DsData),
    Dnskey(DnskeyData),
    Rrsig(RrsigData),
    Nsec(NsecData),
    Other { type_code: u16, data: Vec<u8> },
}

impl RecordData {
    pub fn type_code(&self) -> u16 {
        match self {
            RecordData::Address(IpAddr::V4(_)) => RecordType::A.to_u16(),
            RecordData::Address(IpAddr::V6(_)) => RecordType::AAAA.to_u16(),
            RecordData::Ns(_) => RecordType::NS.to_u16(),
            RecordData::Ds(_) => RecordType::DS.to_u16(),
            RecordData::Cds(_) => RecordType::CDS.to_u16(),
            RecordData::Dnskey(_) => RecordType::DNSKEY.to_u16(),
            RecordData::Rrsig(_) => RecordType::RRSIG.to_u16(),
            RecordData::Nsec(_) => RecordType::NSEC.to_u16(),
            RecordData::Other { type_code, .. } => *type_code,
        }
    }

    /// Decodes uncompressed RDATA of the given type. Types the pipeline
    /// does not inspect are kept as opaque bytes.
    pub fn from_wire(type_code: u16, rdata: &[u8]) -> Result<Self, DomainError> {
        let mut reader = WireReader::new(rdata, type_code);
        let decoded = match RecordType::from_u16(type_code) {
            Some(RecordType::A) => {
                let octets: [u8; 4] = reader.array()?;
                RecordData::Address(IpAddr::V4(Ipv4Addr::from(octets)))
            }
            Some(RecordType::AAAA) => {
                let octets: [u8; 16] = reader.array()?;
                RecordData::Address(IpAddr::V6(Ipv6Addr::from(octets)))
            }
            Some(RecordType::NS) => RecordData::Ns(reader.name()?),
            Some(RecordType::DS) => RecordData::Ds(reader.ds()?),
            Some(RecordType::CDS) => RecordData::Cds(reader.ds()?),
            Some(RecordType::DNSKEY) => RecordData::Dnskey(DnskeyData {
                flags: reader.u16()?,
                protocol: reader.u8()?,
                algorithm: reader.u8()?,
                public_key: reader.rest(),
            }),
            Some(RecordType::RRSIG) => RecordData::Rrsig(RrsigData {
                type_covered: reader.u16()?,
                algorithm: reader.u8()?,
                labels: reader.u8()?,
                original_ttl: reader.u32()?,
                expiration: reader.u32()?,
                inception: reader.u32()?,
                key_tag: reader.u16()?,
                signer: reader.name()?,
                signature: reader.rest(),
            }),
            Some(RecordType::NSEC) => RecordData::Nsec(NsecData {
                next: reader.name()?,
                type_bitmaps: reader.rest(),
            }),
            _ => {
                return Ok(RecordData::Other {
                    type_code,
                    data: rdata.to_vec(),
                })
            }
        };
        reader.finish()?;
        Ok(decoded)
    }
}

struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
    type_code: u16,
}

impl<'a> WireReader<'a> {
    fn new(data: &'a [u8], type_code: u16) -> Self {
        Self {
            data,
            pos: 0,
            type_code,
        }
    }

    fn error(&self, reason: impl Into<String>) -> DomainError {
        let record_type = RecordType::from_u16(self.type_code)
            .map(|t| t.to_string())
            .unwrap_or_else(|| format!("TYPE{}", self.type_code));
        DomainError::InvalidRecordData {
            record_type,
            reason: reason.into(),
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DomainError> {
        let end = self.pos + len;
        if end > self.data.len() {
            return Err(self.error(format!("truncated at offset {}", self.pos)));
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DomainError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, DomainError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, DomainError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DomainError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn rest(&mut self) -> Vec<u8> {
        let rest = self.data[self.pos..].to_vec();
        self.pos = self.data.len();
        rest
    }

    fn ds(&mut self) -> Result<DsData, DomainError> {
        Ok(DsData {
            key_tag: self.u16()?,
            algorithm: self.u8()?,
            digest_type: self.u8()?,
            digest: self.rest(),
        })
    }

    /// Uncompressed name, labels kept as raw octets. Compression pointers
    /// are rejected: RDATA handed to the domain layer is always expanded by
    /// the message parser.
    fn name(&mut self) -> Result<DomainName, DomainError> {
        let mut labels: Vec<&'a [u8]> = Vec::new();
        loop {
            let len = self.u8()? as usize;
            if len == 0 {
                break;
            }
            if len & 0xC0 != 0 {
                return Err(self.error("compressed name in RDATA"));
            }
            labels.push(self.take(len)?);
        }
        DomainName::from_wire_labels(labels).map_err(|e| self.error(e.to_string()))
    }

    fn finish(&self) -> Result<(), DomainError> {
        if self.pos != self.data.len() {
            return Err(self.error("trailing bytes"));
        }
        Ok(())
    }
}
