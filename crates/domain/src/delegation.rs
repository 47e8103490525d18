use crate::{DomainError, DomainName, DsRecord};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Pipeline state of a single delegation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DelegationState {
    Pending,
    AuthPending,
    AuthOk,
    KeyPending,
    Bootstrapped,
    AlreadySecuredSkipped,
    NsMismatchSkipped,
    NotFoundSkipped,
    AuthFailedSkipped,
    NoDataSkipped,
    UnauthenticatedSkipped,
    ResolutionFailedSkipped,
}

impl DelegationState {
    fn is_terminal(&self) -> bool {
        !matches!(
            self,
            DelegationState::Pending
                | DelegationState::AuthPending
                | DelegationState::AuthOk
                | DelegationState::KeyPending
        )
    }

    pub fn can_transition_to(&self, next: DelegationState) -> bool {
        use DelegationState::*;
        matches!(
            (self, next),
            (
                Pending,
                AuthPending
                    | AlreadySecuredSkipped
                    | NsMismatchSkipped
                    | NotFoundSkipped
                    | ResolutionFailedSkipped
            ) | (
                AuthPending,
                AuthOk | AuthFailedSkipped | ResolutionFailedSkipped
            ) | (AuthOk, KeyPending)
                | (
                    KeyPending,
                    Bootstrapped
                        | NoDataSkipped
                        | UnauthenticatedSkipped
                        | ResolutionFailedSkipped
                )
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DelegationState::Pending => "pending",
            DelegationState::AuthPending => "auth-pending",
            DelegationState::AuthOk => "auth-ok",
            DelegationState::KeyPending => "key-pending",
            DelegationState::Bootstrapped => "bootstrapped",
            DelegationState::AlreadySecuredSkipped => "already-secured",
            DelegationState::NsMismatchSkipped => "ns-mismatch",
            DelegationState::NotFoundSkipped => "not-found",
            DelegationState::AuthFailedSkipped => "auth-failed",
            DelegationState::NoDataSkipped => "no-data",
            DelegationState::UnauthenticatedSkipped => "unauthenticated",
            DelegationState::ResolutionFailedSkipped => "resolution-failed",
        }
    }
}

impl fmt::Display for DelegationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage a resolution failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ExistingDs,
    NsConfirmation,
    Authentication,
    KeyState,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::ExistingDs => f.write_str("existing DS lookup"),
            Stage::NsConfirmation => f.write_str("NS confirmation"),
            Stage::Authentication => f.write_str("authentication"),
            Stage::KeyState => f.write_str("key-state retrieval"),
        }
    }
}

/// Why a delegation ended in a skip state. Each variant reads as a
/// sentence an operator can act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    AlreadySecured,
    NotDelegated,
    DelegatedElsewhere { actual: BTreeSet<DomainName> },
    ResolutionFailed { stage: Stage, error: DomainError },
    QuorumNotMet { responding: usize, required: usize },
    ConflictingEvidence,
    NoCds,
    DeleteRequested,
    MixedDeleteRequest,
    CdsNotAuthenticated,
    DnskeyNotAuthenticated,
    ChildCdsInconsistent { nameserver: DomainName },
    ChildDnskeyInconsistent { nameserver: DomainName },
    Bogus { stage: Stage, error: DomainError },
    NoValidatedAlgorithm { dropped: Vec<u8> },
    SignalMismatch,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadySecured => f.write_str("delegation already has a DS RRset"),
            SkipReason::NotDelegated => f.write_str("delegation does not exist at the parent"),
            SkipReason::DelegatedElsewhere { actual } => {
                let names: Vec<&str> = actual.iter().map(|n| n.as_str()).collect();
                write!(f, "delegated to other nameservers: {}", names.join(" "))
            }
            SkipReason::ResolutionFailed { stage, error } => {
                write!(f, "{} could not be resolved: {}", stage, error)
            }
            SkipReason::QuorumNotMet {
                responding,
                required,
            } => write!(
                f,
                "delegated to us but not authenticated yet: {} of {} required nameservers signal it",
                responding, required
            ),
            SkipReason::ConflictingEvidence => {
                f.write_str("nameservers publish conflicting bootstrap signals")
            }
            SkipReason::NoCds => f.write_str("child publishes no CDS RRset"),
            SkipReason::DeleteRequested => f.write_str("child CDS RRset requests DS deletion"),
            SkipReason::MixedDeleteRequest => {
                f.write_str("child CDS RRset mixes delete and regular entries")
            }
            SkipReason::CdsNotAuthenticated => {
                f.write_str("child CDS RRset is not DNSSEC-authenticated")
            }
            SkipReason::DnskeyNotAuthenticated => {
                f.write_str("child DNSKEY RRset is missing or not DNSSEC-authenticated")
            }
            SkipReason::ChildCdsInconsistent { nameserver } => write!(
                f,
                "nameserver {} serves a different CDS RRset than the resolver",
                nameserver
            ),
            SkipReason::ChildDnskeyInconsistent { nameserver } => write!(
                f,
                "nameserver {} serves a different DNSKEY RRset than the resolver",
                nameserver
            ),
            SkipReason::Bogus { stage, error } => {
                write!(f, "{} returned bogus DNSSEC data: {}", stage, error)
            }
            SkipReason::NoValidatedAlgorithm { dropped } => write!(
                f,
                "no CDS algorithm is backed by a DNSKEY signing the DNSKEY RRset (dropped: {:?})",
                dropped
            ),
            SkipReason::SignalMismatch => {
                f.write_str("signalled CDS RRset differs from the child's CDS RRset")
            }
        }
    }
}

/// A child zone moving through the bootstrap pipeline.
#[derive(Debug, Clone)]
pub struct Delegation {
    pub zone: DomainName,
    pub nameservers: BTreeSet<DomainName>,
    state: DelegationState,
    reason: Option<SkipReason>,
}

impl Delegation {
    pub fn new(zone: DomainName, nameservers: BTreeSet<DomainName>) -> Self {
        Self {
            zone,
            nameservers,
            state: DelegationState::Pending,
            reason: None,
        }
    }

    pub fn state(&self) -> DelegationState {
        self.state
    }

    pub fn reason(&self) -> Option<&SkipReason> {
        self.reason.as_ref()
    }

    pub fn advance(&mut self, next: DelegationState) -> Result<(), DomainError> {
        if !self.state.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    /// Moves to a terminal skip state and records the reason.
    pub fn skip(&mut self, next: DelegationState, reason: SkipReason) -> Result<(), DomainError> {
        if !next.is_terminal() || next == DelegationState::Bootstrapped {
            return Err(DomainError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.advance(next)?;
        self.reason = Some(reason);
        Ok(())
    }
}

/// Terminal result of one delegation's pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelegationOutcome {
    Bootstrapped {
        zone: DomainName,
        records: Vec<DsRecord>,
    },
    Skipped {
        zone: DomainName,
        state: DelegationState,
        reason: SkipReason,
    },
}

impl DelegationOutcome {
    pub fn zone(&self) -> &DomainName {
        match self {
            DelegationOutcome::Bootstrapped { zone, .. } => zone,
            DelegationOutcome::Skipped { zone, .. } => zone,
        }
    }

    pub fn state(&self) -> DelegationState {
        match self {
            DelegationOutcome::Bootstrapped { .. } => DelegationState::Bootstrapped,
            DelegationOutcome::Skipped { state, .. } => *state,
        }
    }

    /// DS records to emit; empty for every skip.
    pub fn records(&self) -> &[DsRecord] {
        match self {
            DelegationOutcome::Bootstrapped { records, .. } => records,
            DelegationOutcome::Skipped { .. } => &[],
        }
    }
}
