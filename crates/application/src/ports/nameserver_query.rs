use super::DnsAnswer;
use async_trait::async_trait;
use dsboot_domain::{DnsQuery, DomainError, DomainName};

/// Non-recursive queries sent straight to one of a zone's authoritative
/// nameservers, bypassing the validating resolver.
///
/// Answers carry the records as that server publishes them; the AD bit is
/// meaningless here and callers only compare contents.
#[async_trait]
pub trait NameserverQuery: Send + Sync {
    async fn query_nameserver(
        &self,
        nameserver: &DomainName,
        query: &DnsQuery,
    ) -> Result<DnsAnswer, DomainError>;
}
