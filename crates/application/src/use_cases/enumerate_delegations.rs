use crate::ports::DnsResolver;
use dsboot_domain::{
    AncestorScanRequest, DnsQuery, DomainName, RecordType, SignalingScheme, WalkError,
};
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Sequential NSEC walk below one apex.
///
/// Each step queries NSEC at the last owner name seen and follows its
/// "next" field. The walk ends when "next" wraps back to the apex or
/// leaves the apex's subtree. A "next" that does not sort strictly after
/// the current name, or a walk longer than `step_limit` queries, aborts
/// with a protocol violation.
#[derive(Clone)]
pub struct ZoneWalk {
    resolver: Arc<dyn DnsResolver>,
    step_limit: usize,
}

struct WalkState {
    apex: DomainName,
    current: Option<DomainName>,
    queries: usize,
}

impl ZoneWalk {
    pub fn new(resolver: Arc<dyn DnsResolver>, step_limit: usize) -> Self {
        Self {
            resolver,
            step_limit,
        }
    }

    /// Owner names below `apex` in canonical order. An error is always the
    /// last item of the stream.
    pub fn walk(&self, apex: DomainName) -> BoxStream<'static, Result<DomainName, WalkError>> {
        let resolver = Arc::clone(&self.resolver);
        let step_limit = self.step_limit;
        let state = WalkState {
            current: Some(apex.clone()),
            apex,
            queries: 0,
        };

        stream::unfold(state, move |mut state| {
            let resolver = Arc::clone(&resolver);
            async move {
                let current = state.current.take()?;
                if state.queries >= step_limit {
                    return Some((Err(WalkError::StepLimitExceeded(step_limit)), state));
                }
                state.queries += 1;

                match next_owner(resolver.as_ref(), &state.apex, &current).await {
                    Ok(Some(next)) => {
                        state.current = Some(next.clone());
                        Some((Ok(next), state))
                    }
                    Ok(None) => None,
                    Err(e) => Some((Err(e), state)),
                }
            }
        })
        .boxed()
    }
}

async fn next_owner(
    resolver: &dyn DnsResolver,
    apex: &DomainName,
    current: &DomainName,
) -> Result<Option<DomainName>, WalkError> {
    let query = DnsQuery::new(current.clone(), RecordType::NSEC);
    let answer = resolver
        .resolve(&query)
        .await
        .map_err(|source| WalkError::Resolution {
            name: current.to_string(),
            source,
        })?;

    if !answer.authenticated {
        return Err(WalkError::NotAuthenticated(current.to_string()));
    }
    let nsec = answer
        .nsec(current)
        .ok_or_else(|| WalkError::NoNsec(current.to_string()))?;

    let next = &nsec.next;
    if next == apex || !next.is_subdomain_of(apex) {
        return Ok(None);
    }
    if next <= current {
        return Err(WalkError::ProtocolViolation {
            current: current.to_string(),
            next: next.to_string(),
        });
    }
    Ok(Some(next.clone()))
}

/// Use case: discover candidate delegations below an ancestor by walking
/// each nameserver's signaling namespace
pub struct EnumerateDelegationsUseCase {
    walk: ZoneWalk,
    scheme: SignalingScheme,
}

impl EnumerateDelegationsUseCase {
    pub fn new(resolver: Arc<dyn DnsResolver>, scheme: SignalingScheme, step_limit: usize) -> Self {
        Self {
            walk: ZoneWalk::new(resolver, step_limit),
            scheme,
        }
    }

    /// Lazy, deduplicated sequence of child names one label below the
    /// ancestor. Walk failures end that nameserver's walk with a diagnostic
    /// and never fail the scan.
    pub fn execute(&self, request: &AncestorScanRequest) -> BoxStream<'static, DomainName> {
        let scheme = self.scheme;
        let ancestor = request.ancestor.clone();

        let walks: Vec<(DomainName, DomainName)> = request
            .nameservers
            .iter()
            .filter_map(|ns| match scheme.walk_apex(&ancestor, ns) {
                Ok(apex) => Some((ns.clone(), apex)),
                Err(e) => {
                    warn!(ancestor = %ancestor, nameserver = %ns, error = %e, "Cannot build walk apex");
                    None
                }
            })
            .collect();

        let walk = self.walk.clone();
        let mut seen = HashSet::new();

        stream::iter(walks)
            .flat_map(move |(ns, apex)| {
                info!(ancestor = %ancestor, nameserver = %ns, apex = %apex, "Walking signaling zone");
                let ancestor = ancestor.clone();
                let walk_apex = apex.clone();
                walk.walk(apex).scan((), move |_, item| {
                    let next = match item {
                        Ok(owner) => Some(scheme.candidate_from_owner(&owner, &walk_apex, &ancestor)),
                        Err(e) if e.is_protocol_violation() => {
                            error!(nameserver = %ns, apex = %walk_apex, error = %e, "Zone walk aborted");
                            None
                        }
                        Err(e) => {
                            warn!(nameserver = %ns, apex = %walk_apex, error = %e, "Zone walk stopped");
                            None
                        }
                    };
                    future::ready(next)
                })
            })
            .filter_map(future::ready)
            .filter(move |candidate| {
                let fresh = seen.insert(candidate.clone());
                if fresh {
                    debug!(candidate = %candidate, "Discovered delegation candidate");
                }
                future::ready(fresh)
            })
            .boxed()
    }
}
