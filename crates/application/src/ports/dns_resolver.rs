use async_trait::async_trait;
use dsboot_domain::{
    DnsQuery, DnskeyData, DomainError, DomainName, DsData, NsecData, RecordData, RecordType,
    ResourceRecord, RrsigData,
};
use std::collections::BTreeSet;
use std::net::IpAddr;

/// Answer from the validating resolver.
///
/// NXDOMAIN and NODATA are successful answers with no records; timeouts,
/// transport failures and bogus data are reported as `Err` by the resolver
/// so callers can tell "confirmed absent" from "indeterminate".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsAnswer {
    /// Answer section, RRSIGs included.
    pub records: Vec<ResourceRecord>,
    /// Authority section; carries the NSEC records of negative answers.
    pub authority: Vec<ResourceRecord>,
    /// The resolver set the AD bit.
    pub authenticated: bool,
    pub nxdomain: bool,
}

impl DnsAnswer {
    pub fn new(records: Vec<ResourceRecord>, authenticated: bool) -> Self {
        Self {
            records,
            authority: Vec::new(),
            authenticated,
            nxdomain: false,
        }
    }

    pub fn nodata(authenticated: bool) -> Self {
        Self::new(Vec::new(), authenticated)
    }

    pub fn nxdomain(authenticated: bool) -> Self {
        Self {
            nxdomain: true,
            ..Self::nodata(authenticated)
        }
    }

    pub fn with_authority(mut self, authority: Vec<ResourceRecord>) -> Self {
        self.authority = authority;
        self
    }

    fn at<'a, 'b>(
        &'a self,
        owner: &'b DomainName,
    ) -> impl Iterator<Item = &'a ResourceRecord> + 'b
    where
        'a: 'b,
    {
        self.records.iter().filter(move |rr| &rr.owner == owner)
    }

    /// A and AAAA addresses at `owner`.
    pub fn addresses(&self, owner: &DomainName) -> Vec<IpAddr> {
        self.at(owner).filter_map(|rr| rr.as_address()).collect()
    }

    pub fn ns_targets(&self, owner: &DomainName) -> BTreeSet<DomainName> {
        self.at(owner).filter_map(|rr| rr.as_ns()).cloned().collect()
    }

    pub fn ds_set(&self, owner: &DomainName) -> Vec<DsData> {
        self.at(owner).filter_map(|rr| rr.as_ds()).cloned().collect()
    }

    /// CDS entries at `owner`, sorted and without duplicates so two
    /// answers can be compared as sets.
    pub fn cds_set(&self, owner: &DomainName) -> Vec<DsData> {
        let set: BTreeSet<DsData> = self.at(owner).filter_map(|rr| rr.as_cds()).cloned().collect();
        set.into_iter().collect()
    }

    pub fn dnskeys(&self, owner: &DomainName) -> Vec<DnskeyData> {
        self.at(owner).filter_map(|rr| rr.as_dnskey()).cloned().collect()
    }

    pub fn rrsigs_covering(&self, owner: &DomainName, record_type: RecordType) -> Vec<&RrsigData> {
        self.at(owner)
            .filter_map(|rr| rr.as_rrsig())
            .filter(|sig| sig.covers(record_type))
            .collect()
    }

    /// NSEC record of this answer: the one owned by `owner` in the answer
    /// section, else the first one in the authority section.
    pub fn nsec(&self, owner: &DomainName) -> Option<&NsecData> {
        let from_answer = self.at(owner).find_map(|rr| match &rr.data {
            RecordData::Nsec(nsec) => Some(nsec),
            _ => None,
        });
        from_answer.or_else(|| {
            self.authority.iter().find_map(|rr| match &rr.data {
                RecordData::Nsec(nsec) => Some(nsec),
                _ => None,
            })
        })
    }
}

#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve(&self, query: &DnsQuery) -> Result<DnsAnswer, DomainError>;
}
