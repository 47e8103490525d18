use crate::{DomainName, DsData};
use std::collections::BTreeSet;

/// Validated key material of a child zone.
///
/// `cds` holds only entries whose algorithm passed the self-signature
/// check; `published_cds` is the RRset exactly as the child serves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyState {
    pub zone: DomainName,
    pub cds: Vec<DsData>,
    pub published_cds: Vec<DsData>,
    pub dropped_algorithms: BTreeSet<u8>,
}
