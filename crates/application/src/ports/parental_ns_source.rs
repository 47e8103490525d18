use async_trait::async_trait;
use dsboot_domain::{DomainError, DomainName};
use std::collections::BTreeSet;

/// Authoritative record of which nameservers a delegation points to, as
/// known to the parent (registry database, registrar data, ...).
#[async_trait]
pub trait ParentalNsSource: Send + Sync {
    /// `Ok(None)` when the delegation does not exist at the parent.
    async fn lookup_ns(
        &self,
        zone: &DomainName,
    ) -> Result<Option<BTreeSet<DomainName>>, DomainError>;
}
