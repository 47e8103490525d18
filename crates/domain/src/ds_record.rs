use crate::{DomainName, DsData};
use std::fmt;

/// Parent-side DS record synthesized from a validated CDS entry.
///
/// The TTL is informational and always 0; the parental zone assigns the
/// real one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsRecord {
    pub owner: DomainName,
    pub ttl: u32,
    pub data: DsData,
}

impl DsRecord {
    pub fn from_cds(owner: DomainName, cds: &DsData) -> Self {
        Self {
            owner,
            ttl: 0,
            data: cds.clone(),
        }
    }

    /// Sort key: algorithm, digest type, then key tag and digest.
    pub fn presentation_key(&self) -> (u8, u8, u16, &[u8]) {
        (
            self.data.algorithm,
            self.data.digest_type,
            self.data.key_tag,
            &self.data.digest,
        )
    }
}

impl fmt::Display for DsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} IN DS {} {} {} {}",
            self.owner,
            self.ttl,
            self.data.key_tag,
            self.data.algorithm,
            self.data.digest_type,
            self.data.digest_hex()
        )
    }
}
