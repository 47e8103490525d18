use super::StubResolver;
use dsboot_application::ports::DnsAnswer;
use dsboot_domain::{
    DnskeyData, DomainName, DsData, NsecData, RecordData, RecordType, ResourceRecord, RrsigData,
    SignalingScheme,
};
use std::collections::BTreeSet;

pub fn name(s: &str) -> DomainName {
    DomainName::parse(s).unwrap()
}

pub fn names(list: &[&str]) -> BTreeSet<DomainName> {
    list.iter().map(|s| name(s)).collect()
}

/// KSK-flagged zone key; `seed` varies the public key and thus the key tag.
pub fn ksk(algorithm: u8, seed: u8) -> DnskeyData {
    DnskeyData::new(257, algorithm, vec![seed; 64])
}

pub fn cds_for(key: &DnskeyData, digest_type: u8) -> DsData {
    let len = if digest_type == 4 { 48 } else { 32 };
    DsData::new(
        key.key_tag(),
        key.algorithm,
        digest_type,
        vec![key.public_key[0] ^ digest_type; len],
    )
}

pub fn rrsig_by(zone: &DomainName, key: &DnskeyData) -> ResourceRecord {
    ResourceRecord::new(
        zone.clone(),
        3600,
        RecordData::Rrsig(RrsigData {
            type_covered: RecordType::DNSKEY.to_u16(),
            algorithm: key.algorithm,
            labels: zone.label_count() as u8,
            original_ttl: 3600,
            expiration: u32::MAX,
            inception: 0,
            key_tag: key.key_tag(),
            signer: zone.clone(),
            signature: vec![0xaa; 64],
        }),
    )
}

pub fn cds_answer(owner: &DomainName, cds: &[DsData], authenticated: bool) -> DnsAnswer {
    DnsAnswer::new(
        cds.iter()
            .map(|entry| ResourceRecord::new(owner.clone(), 0, RecordData::Cds(entry.clone())))
            .collect(),
        authenticated,
    )
}

pub fn nsec_answer(owner: &DomainName, next: &DomainName) -> DnsAnswer {
    DnsAnswer::new(
        vec![ResourceRecord::new(
            owner.clone(),
            3600,
            RecordData::Nsec(NsecData {
                next: next.clone(),
                type_bitmaps: vec![],
            }),
        )],
        true,
    )
}

/// Publishes a child zone's CDS RRset and a DNSKEY RRset signed by
/// `signers`.
pub async fn publish_child(
    resolver: &StubResolver,
    zone: &DomainName,
    cds: &[DsData],
    keys: &[DnskeyData],
    signers: &[&DnskeyData],
) {
    resolver
        .set_answer(zone, RecordType::CDS, cds_answer(zone, cds, true))
        .await;

    let mut records: Vec<ResourceRecord> = keys
        .iter()
        .map(|key| ResourceRecord::new(zone.clone(), 3600, RecordData::Dnskey(key.clone())))
        .collect();
    records.extend(signers.iter().map(|key| rrsig_by(zone, key)));
    resolver
        .set_answer(zone, RecordType::DNSKEY, DnsAnswer::new(records, true))
        .await;
}

/// Publishes an authenticated bootstrap signal under each nameserver.
pub async fn publish_signals(
    resolver: &StubResolver,
    scheme: SignalingScheme,
    zone: &DomainName,
    nameservers: &BTreeSet<DomainName>,
    cds: &[DsData],
) {
    for ns in nameservers {
        let signal = scheme.signal_name(zone, ns).unwrap();
        resolver
            .set_answer(&signal, RecordType::CDS, cds_answer(&signal, cds, true))
            .await;
    }
}

/// Publishes an NSEC chain `apex -> owners[0] -> ... -> apex`.
pub async fn publish_nsec_chain(resolver: &StubResolver, apex: &DomainName, owners: &[DomainName]) {
    let mut chain = vec![apex.clone()];
    chain.extend(owners.iter().cloned());
    for (i, owner) in chain.iter().enumerate() {
        let next = chain.get(i + 1).unwrap_or(apex);
        resolver
            .set_answer(owner, RecordType::NSEC, nsec_answer(owner, next))
            .await;
    }
}
