use crate::ports::DnsResolver;
use dsboot_domain::config::QuorumThreshold;
use dsboot_domain::{
    DnsQuery, DomainError, DomainName, DsData, RecordType, SignalingScheme, SkipReason,
};
use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Where evidence is looked up and how much of it is enough.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthenticationPolicy {
    pub scheme: SignalingScheme,
    pub quorum: QuorumThreshold,
}

/// Consistent, authenticated CDS RRset signalled by a quorum of the
/// claimed nameservers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationEvidence {
    /// Sorted, deduplicated.
    pub cds: Vec<DsData>,
    /// Nameservers whose signaling name carried the evidence.
    pub signals: BTreeSet<DomainName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationResult {
    Authenticated(AuthenticationEvidence),
    Unauthenticated(SkipReason),
}

enum Signal {
    Evidence(DomainName, Vec<DsData>),
    Absent,
    Failed(DomainError),
}

/// Use case: confirm the bootstrap signal published under each claimed
/// nameserver's own namespace
pub struct ValidateAuthenticationUseCase {
    resolver: Arc<dyn DnsResolver>,
    policy: AuthenticationPolicy,
}

impl ValidateAuthenticationUseCase {
    pub fn new(resolver: Arc<dyn DnsResolver>, policy: AuthenticationPolicy) -> Self {
        Self { resolver, policy }
    }

    /// Unauthenticated or empty answers contribute no evidence. When the
    /// quorum is missed and a nameserver could not be queried at all, the
    /// resolution error is returned instead, since the outcome is
    /// indeterminate rather than negative.
    pub async fn execute(
        &self,
        zone: &DomainName,
        nameservers: &BTreeSet<DomainName>,
    ) -> Result<AuthenticationResult, DomainError> {
        let signals = join_all(nameservers.iter().map(|ns| self.fetch_signal(zone, ns))).await;

        let mut evidence: Vec<(DomainName, Vec<DsData>)> = Vec::new();
        let mut failure = None;
        for signal in signals {
            match signal {
                Signal::Evidence(ns, cds) => evidence.push((ns, cds)),
                Signal::Absent => {}
                Signal::Failed(e) => {
                    failure.get_or_insert(e);
                }
            }
        }

        if let Some((_, first)) = evidence.first() {
            if evidence.iter().any(|(_, cds)| cds != first) {
                warn!(zone = %zone, "Nameservers signal different CDS RRsets");
                return Ok(AuthenticationResult::Unauthenticated(
                    SkipReason::ConflictingEvidence,
                ));
            }
        }

        let required = self.policy.quorum.required(nameservers.len());
        if evidence.len() < required {
            if let Some(e) = failure {
                return Err(e);
            }
            return Ok(AuthenticationResult::Unauthenticated(
                SkipReason::QuorumNotMet {
                    responding: evidence.len(),
                    required,
                },
            ));
        }

        let cds = evidence
            .first()
            .map(|(_, cds)| cds.clone())
            .unwrap_or_default();
        let signals = evidence.into_iter().map(|(ns, _)| ns).collect();
        Ok(AuthenticationResult::Authenticated(AuthenticationEvidence {
            cds,
            signals,
        }))
    }

    async fn fetch_signal(&self, zone: &DomainName, nameserver: &DomainName) -> Signal {
        let name = match self.policy.scheme.signal_name(zone, nameserver) {
            Ok(name) => name,
            Err(e) => {
                warn!(zone = %zone, nameserver = %nameserver, error = %e, "Cannot build signaling name");
                return Signal::Absent;
            }
        };

        match self
            .resolver
            .resolve(&DnsQuery::new(name.clone(), RecordType::CDS))
            .await
        {
            Ok(answer) if !answer.authenticated => {
                debug!(zone = %zone, signal = %name, "Signal not DNSSEC-authenticated");
                Signal::Absent
            }
            Ok(answer) => {
                let cds = answer.cds_set(&name);
                if cds.is_empty() {
                    debug!(zone = %zone, signal = %name, "No signal published");
                    Signal::Absent
                } else {
                    debug!(zone = %zone, signal = %name, entries = cds.len(), "Signal found");
                    Signal::Evidence(nameserver.clone(), cds)
                }
            }
            Err(e) if e.is_bogus() => {
                warn!(zone = %zone, signal = %name, error = %e, "Bogus signal ignored");
                Signal::Absent
            }
            Err(e) => {
                debug!(zone = %zone, signal = %name, error = %e, "Signal lookup failed");
                Signal::Failed(e)
            }
        }
    }
}
