use dsboot_domain::{DomainName, DsRecord, KeyState};

/// Use case: project validated CDS entries onto parent-side DS records
///
/// Digests are copied verbatim. Output is ordered by algorithm, digest
/// type, key tag and digest so reruns are byte-identical.
#[derive(Debug, Clone, Copy, Default)]
pub struct SynthesizeDsUseCase;

impl SynthesizeDsUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, zone: &DomainName, key_state: &KeyState) -> Vec<DsRecord> {
        let mut records: Vec<DsRecord> = key_state
            .cds
            .iter()
            .filter(|cds| !cds.is_delete())
            .map(|cds| DsRecord::from_cds(zone.clone(), cds))
            .collect();
        records.sort_by(|a, b| a.presentation_key().cmp(&b.presentation_key()));
        records.dedup();
        records
    }
}
