use async_trait::async_trait;
use dsboot_application::ports::{
    DnsAnswer, DnsResolver, DnssecVerifier, NameserverQuery, ParentalNsSource,
};
use dsboot_domain::{
    DnsQuery, DnskeyData, DomainError, DomainName, DsData, RecordType, RrsigData,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

// ============================================================================
// Stub DnsResolver
// ============================================================================

type AnswerTable<K> = Arc<RwLock<HashMap<K, Result<DnsAnswer, DomainError>>>>;

/// Resolver keyed by (name, type). Unknown queries get an authenticated
/// NODATA answer.
///
/// Direct nameserver queries see the same data unless a nameserver has an
/// answer of its own; they are logged apart from resolver queries.
#[derive(Clone, Default)]
pub struct StubResolver {
    answers: AnswerTable<(DomainName, RecordType)>,
    queries: Arc<RwLock<Vec<DnsQuery>>>,
    direct_answers: AnswerTable<(DomainName, DomainName, RecordType)>,
    direct_queries: Arc<RwLock<Vec<(DomainName, DnsQuery)>>>,
}

impl StubResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_answer(&self, name: &DomainName, record_type: RecordType, answer: DnsAnswer) {
        self.answers
            .write()
            .await
            .insert((name.clone(), record_type), Ok(answer));
    }

    pub async fn set_error(&self, name: &DomainName, record_type: RecordType, error: DomainError) {
        self.answers
            .write()
            .await
            .insert((name.clone(), record_type), Err(error));
    }

    /// Answer served by `nameserver` alone when asked directly.
    pub async fn set_nameserver_answer(
        &self,
        nameserver: &DomainName,
        name: &DomainName,
        record_type: RecordType,
        answer: DnsAnswer,
    ) {
        self.direct_answers
            .write()
            .await
            .insert((nameserver.clone(), name.clone(), record_type), Ok(answer));
    }

    pub async fn set_nameserver_error(
        &self,
        nameserver: &DomainName,
        name: &DomainName,
        record_type: RecordType,
        error: DomainError,
    ) {
        self.direct_answers
            .write()
            .await
            .insert((nameserver.clone(), name.clone(), record_type), Err(error));
    }

    pub async fn direct_queries(&self) -> Vec<(DomainName, DnsQuery)> {
        self.direct_queries.read().await.clone()
    }

    pub async fn queries(&self) -> Vec<DnsQuery> {
        self.queries.read().await.clone()
    }

    pub async fn query_count(&self, record_type: RecordType) -> usize {
        self.queries
            .read()
            .await
            .iter()
            .filter(|q| q.record_type == record_type)
            .count()
    }
}

#[async_trait]
impl DnsResolver for StubResolver {
    async fn resolve(&self, query: &DnsQuery) -> Result<DnsAnswer, DomainError> {
        self.queries.write().await.push(query.clone());
        self.answers
            .read()
            .await
            .get(&(query.name.clone(), query.record_type))
            .cloned()
            .unwrap_or_else(|| Ok(DnsAnswer::nodata(true)))
    }
}

#[async_trait]
impl NameserverQuery for StubResolver {
    async fn query_nameserver(
        &self,
        nameserver: &DomainName,
        query: &DnsQuery,
    ) -> Result<DnsAnswer, DomainError> {
        self.direct_queries
            .write()
            .await
            .push((nameserver.clone(), query.clone()));
        let key = (nameserver.clone(), query.name.clone(), query.record_type);
        if let Some(answer) = self.direct_answers.read().await.get(&key) {
            return answer.clone();
        }
        self.answers
            .read()
            .await
            .get(&(query.name.clone(), query.record_type))
            .cloned()
            .unwrap_or_else(|| Ok(DnsAnswer::nodata(false)))
    }
}

// ============================================================================
// Concurrency tracking wrapper
// ============================================================================

/// Holds every lookup open for a moment and records the highest number of
/// lookups, resolver and direct alike, in flight at once.
#[derive(Clone)]
pub struct ConcurrencyTracker {
    inner: StubResolver,
    hold: Duration,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ConcurrencyTracker {
    pub fn new(inner: StubResolver, hold: Duration) -> Self {
        Self {
            inner,
            hold,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn tracked<T>(&self, lookup: impl std::future::Future<Output = T>) -> T {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.hold).await;
        let result = lookup.await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl DnsResolver for ConcurrencyTracker {
    async fn resolve(&self, query: &DnsQuery) -> Result<DnsAnswer, DomainError> {
        self.tracked(self.inner.resolve(query)).await
    }
}

#[async_trait]
impl NameserverQuery for ConcurrencyTracker {
    async fn query_nameserver(
        &self,
        nameserver: &DomainName,
        query: &DnsQuery,
    ) -> Result<DnsAnswer, DomainError> {
        self.tracked(self.inner.query_nameserver(nameserver, query))
            .await
    }
}

// ============================================================================
// Scripted DnssecVerifier
// ============================================================================

/// Digest check compares key tag and algorithm; an RRSIG verifies when its
/// key tag is in the signing set.
#[derive(Clone, Default)]
pub struct ScriptedVerifier {
    signing: HashSet<u16>,
}

impl ScriptedVerifier {
    pub fn signing(keys: &[&DnskeyData]) -> Self {
        Self {
            signing: keys.iter().map(|k| k.key_tag()).collect(),
        }
    }

    pub fn rejecting_all() -> Self {
        Self::default()
    }
}

impl DnssecVerifier for ScriptedVerifier {
    fn verify_dnskey_rrset(
        &self,
        _zone: &DomainName,
        rrset: &[DnskeyData],
        rrsig: &RrsigData,
        key: &DnskeyData,
    ) -> Result<bool, DomainError> {
        Ok(rrset.contains(key)
            && rrsig.key_tag == key.key_tag()
            && self.signing.contains(&key.key_tag()))
    }

    fn digest_matches(
        &self,
        _zone: &DomainName,
        ds: &DsData,
        key: &DnskeyData,
    ) -> Result<bool, DomainError> {
        Ok(ds.key_tag == key.key_tag() && ds.algorithm == key.algorithm)
    }
}

// ============================================================================
// Static ParentalNsSource
// ============================================================================

#[derive(Clone, Default)]
pub struct StaticParentalNs {
    delegations: Arc<RwLock<HashMap<DomainName, Result<BTreeSet<DomainName>, DomainError>>>>,
}

impl StaticParentalNs {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn delegate(&self, zone: &DomainName, nameservers: &BTreeSet<DomainName>) {
        self.delegations
            .write()
            .await
            .insert(zone.clone(), Ok(nameservers.clone()));
    }

    pub async fn fail(&self, zone: &DomainName, error: DomainError) {
        self.delegations
            .write()
            .await
            .insert(zone.clone(), Err(error));
    }
}

#[async_trait]
impl ParentalNsSource for StaticParentalNs {
    async fn lookup_ns(
        &self,
        zone: &DomainName,
    ) -> Result<Option<BTreeSet<DomainName>>, DomainError> {
        match self.delegations.read().await.get(zone) {
            Some(Ok(nameservers)) => Ok(Some(nameservers.clone())),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(None),
        }
    }
}
