use crate::{DelegationOutcome, DelegationState};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-state tally of terminal outcomes for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanStats {
    zones: BTreeMap<&'static str, Vec<String>>,
    records_emitted: usize,
}

const TERMINAL_STATES: [DelegationState; 8] = [
    DelegationState::Bootstrapped,
    DelegationState::AlreadySecuredSkipped,
    DelegationState::NsMismatchSkipped,
    DelegationState::NotFoundSkipped,
    DelegationState::AuthFailedSkipped,
    DelegationState::NoDataSkipped,
    DelegationState::UnauthenticatedSkipped,
    DelegationState::ResolutionFailedSkipped,
];

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &DelegationOutcome) {
        self.records_emitted += outcome.records().len();
        self.zones
            .entry(outcome.state().as_str())
            .or_default()
            .push(outcome.zone().to_string());
    }

    pub fn count(&self, state: DelegationState) -> usize {
        self.zones.get(state.as_str()).map_or(0, Vec::len)
    }

    pub fn total(&self) -> usize {
        self.zones.values().map(Vec::len).sum()
    }

    pub fn records_emitted(&self) -> usize {
        self.records_emitted
    }

    /// Fixed-width table with one line per terminal state.
    pub fn report(&self) -> String {
        TERMINAL_STATES
            .iter()
            .map(|state| format!("{:<20} {}", state.as_str(), self.count(*state)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
