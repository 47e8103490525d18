use async_trait::async_trait;
use dsboot_application::ports::{DnsResolver, ParentalNsSource};
use dsboot_domain::{DnsQuery, DomainError, DomainName, RecordType};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Answers NS confirmation from a plain NS query.
///
/// A recursive resolver may return the child's apex NS set rather than the
/// delegation the parent actually publishes, so this only stands in for a
/// registry or registrar feed.
pub struct DnsParentalNsSource {
    resolver: Arc<dyn DnsResolver>,
}

impl DnsParentalNsSource {
    pub fn new(resolver: Arc<dyn DnsResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl ParentalNsSource for DnsParentalNsSource {
    async fn lookup_ns(
        &self,
        zone: &DomainName,
    ) -> Result<Option<BTreeSet<DomainName>>, DomainError> {
        warn!(
            zone = %zone,
            "NS confirmation uses a DNS query instead of parental registry data; \
             this is not safe for production use"
        );

        let answer = self
            .resolver
            .resolve(&DnsQuery::new(zone.clone(), RecordType::NS))
            .await?;

        if answer.nxdomain {
            debug!(zone = %zone, "Delegation does not exist");
            return Ok(None);
        }

        let targets = answer.ns_targets(zone);
        if targets.is_empty() {
            return Ok(None);
        }
        Ok(Some(targets))
    }
}
