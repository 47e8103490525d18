use crate::ports::{DnsAnswer, DnsResolver, DnssecVerifier, NameserverQuery};
use dsboot_domain::{
    DnsQuery, DnskeyData, DomainError, DomainName, DsData, KeyState, RecordType, RrsigData,
    SkipReason,
};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStateOutcome {
    Valid(KeyState),
    NoData(SkipReason),
    Unauthenticated(SkipReason),
}

/// Use case: fetch the child's CDS and DNSKEY RRsets and keep only the CDS
/// algorithms that are actively signing the DNSKEY RRset (RFC 7344 4.1)
///
/// Both RRsets must be served identically by every authoritative
/// nameserver of the delegation, so a half-finished key rollover is never
/// picked up from whichever server the resolver happened to ask.
pub struct ValidateKeyStateUseCase {
    resolver: Arc<dyn DnsResolver>,
    nameservers: Arc<dyn NameserverQuery>,
    verifier: Arc<dyn DnssecVerifier>,
}

impl ValidateKeyStateUseCase {
    pub fn new(
        resolver: Arc<dyn DnsResolver>,
        nameservers: Arc<dyn NameserverQuery>,
        verifier: Arc<dyn DnssecVerifier>,
    ) -> Self {
        Self {
            resolver,
            nameservers,
            verifier,
        }
    }

    pub async fn execute(
        &self,
        zone: &DomainName,
        nameservers: &BTreeSet<DomainName>,
    ) -> Result<KeyStateOutcome, DomainError> {
        let answer = self
            .resolver
            .resolve(&DnsQuery::new(zone.clone(), RecordType::CDS))
            .await?;
        if !answer.authenticated {
            return Ok(KeyStateOutcome::Unauthenticated(
                SkipReason::CdsNotAuthenticated,
            ));
        }

        let published = answer.cds_set(zone);
        let disagreeing = self
            .first_disagreeing(zone, nameservers, RecordType::CDS, |direct| {
                direct.cds_set(zone) == published
            })
            .await?;
        if let Some(nameserver) = disagreeing {
            warn!(zone = %zone, nameserver = %nameserver, "Nameservers serve different CDS RRsets");
            return Ok(KeyStateOutcome::Unauthenticated(
                SkipReason::ChildCdsInconsistent { nameserver },
            ));
        }

        if published.is_empty() {
            return Ok(KeyStateOutcome::NoData(SkipReason::NoCds));
        }
        let deletes = published.iter().filter(|cds| cds.is_delete()).count();
        if deletes == published.len() {
            return Ok(KeyStateOutcome::NoData(SkipReason::DeleteRequested));
        }
        if deletes > 0 {
            return Ok(KeyStateOutcome::Unauthenticated(
                SkipReason::MixedDeleteRequest,
            ));
        }

        let answer = self
            .resolver
            .resolve(&DnsQuery::new(zone.clone(), RecordType::DNSKEY))
            .await?;
        let dnskeys = answer.dnskeys(zone);
        if !answer.authenticated || dnskeys.is_empty() {
            return Ok(KeyStateOutcome::Unauthenticated(
                SkipReason::DnskeyNotAuthenticated,
            ));
        }
        let expected: HashSet<&DnskeyData> = dnskeys.iter().collect();
        let disagreeing = self
            .first_disagreeing(zone, nameservers, RecordType::DNSKEY, |direct| {
                let served = direct.dnskeys(zone);
                served.iter().collect::<HashSet<_>>() == expected
            })
            .await?;
        if let Some(nameserver) = disagreeing {
            warn!(zone = %zone, nameserver = %nameserver, "Nameservers serve different DNSKEY RRsets");
            return Ok(KeyStateOutcome::Unauthenticated(
                SkipReason::ChildDnskeyInconsistent { nameserver },
            ));
        }
        let rrsigs = answer.rrsigs_covering(zone, RecordType::DNSKEY);

        let mut by_algorithm: BTreeMap<u8, Vec<&DsData>> = BTreeMap::new();
        for cds in &published {
            by_algorithm.entry(cds.algorithm).or_default().push(cds);
        }

        let mut validated = BTreeSet::new();
        let mut dropped = BTreeSet::new();
        for (algorithm, entries) in &by_algorithm {
            if self.algorithm_signs(zone, *algorithm, entries, &dnskeys, &rrsigs) {
                debug!(zone = %zone, algorithm, "CDS algorithm signs the DNSKEY RRset");
                validated.insert(*algorithm);
            } else {
                warn!(zone = %zone, algorithm, "DNSKEY RRset not signed by any key referenced from CDS");
                dropped.insert(*algorithm);
            }
        }

        if validated.is_empty() {
            return Ok(KeyStateOutcome::Unauthenticated(
                SkipReason::NoValidatedAlgorithm {
                    dropped: dropped.into_iter().collect(),
                },
            ));
        }

        let cds = published
            .iter()
            .filter(|entry| validated.contains(&entry.algorithm))
            .cloned()
            .collect();
        Ok(KeyStateOutcome::Valid(KeyState {
            zone: zone.clone(),
            cds,
            published_cds: published,
            dropped_algorithms: dropped,
        }))
    }

    /// Asks each nameserver directly for `record_type` at `zone` and returns
    /// the first one whose copy fails `agrees`. Queries run one after the
    /// other so a delegation never holds more than one lookup in flight.
    async fn first_disagreeing<F>(
        &self,
        zone: &DomainName,
        nameservers: &BTreeSet<DomainName>,
        record_type: RecordType,
        agrees: F,
    ) -> Result<Option<DomainName>, DomainError>
    where
        F: Fn(&DnsAnswer) -> bool + Send + Sync,
    {
        let query = DnsQuery::new(zone.clone(), record_type);
        for nameserver in nameservers {
            let direct = self.nameservers.query_nameserver(nameserver, &query).await?;
            if !agrees(&direct) {
                return Ok(Some(nameserver.clone()));
            }
            debug!(zone = %zone, nameserver = %nameserver, record_type = %record_type, "Nameserver agrees");
        }
        Ok(None)
    }

    /// An algorithm survives when a zone key of that algorithm is referenced
    /// by one of its CDS entries and verifies an RRSIG over the DNSKEY RRset.
    fn algorithm_signs(
        &self,
        zone: &DomainName,
        algorithm: u8,
        entries: &[&DsData],
        dnskeys: &[DnskeyData],
        rrsigs: &[&RrsigData],
    ) -> bool {
        dnskeys
            .iter()
            .filter(|key| key.algorithm == algorithm && key.is_zone_key() && !key.is_revoked())
            .filter(|key| {
                let tag = key.key_tag();
                entries
                    .iter()
                    .filter(|cds| cds.key_tag == tag)
                    .any(|cds| self.check(zone, self.verifier.digest_matches(zone, cds, key)))
            })
            .any(|key| {
                let tag = key.key_tag();
                rrsigs
                    .iter()
                    .filter(|sig| sig.key_tag == tag && sig.algorithm == algorithm)
                    .any(|sig| {
                        self.check(
                            zone,
                            self.verifier.verify_dnskey_rrset(zone, dnskeys, sig, key),
                        )
                    })
            })
    }

    fn check(&self, zone: &DomainName, result: Result<bool, DomainError>) -> bool {
        result.unwrap_or_else(|e| {
            debug!(zone = %zone, error = %e, "DNSSEC check not possible");
            false
        })
    }
}
