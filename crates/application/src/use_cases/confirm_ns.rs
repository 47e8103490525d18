use crate::ports::ParentalNsSource;
use dsboot_domain::{DomainError, DomainName};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NsConfirmation {
    Confirmed,
    /// Delegated, but to a different nameserver set.
    Mismatch { actual: BTreeSet<DomainName> },
    NotFound,
}

/// Use case: compare the parent's NS RRset for a delegation with the
/// caller-supplied trust anchor
pub struct ConfirmNsUseCase {
    source: Arc<dyn ParentalNsSource>,
}

impl ConfirmNsUseCase {
    pub fn new(source: Arc<dyn ParentalNsSource>) -> Self {
        Self { source }
    }

    pub async fn execute(
        &self,
        zone: &DomainName,
        claimed: &BTreeSet<DomainName>,
    ) -> Result<NsConfirmation, DomainError> {
        let actual = match self.source.lookup_ns(zone).await? {
            Some(actual) if !actual.is_empty() => actual,
            _ => return Ok(NsConfirmation::NotFound),
        };

        // Names are canonical, so set equality is case-insensitive.
        if &actual == claimed {
            debug!(zone = %zone, "NS set confirmed");
            Ok(NsConfirmation::Confirmed)
        } else {
            Ok(NsConfirmation::Mismatch { actual })
        }
    }
}
