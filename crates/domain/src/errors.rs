use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid directive on line {line}: {reason}")]
    InvalidDirective { line: usize, reason: String },

    #[error("Invalid record data for {record_type}: {reason}")]
    InvalidRecordData { record_type: String, reason: String },

    #[error("DNSSEC validation failed: {0}")]
    DnssecValidationFailed(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Unsupported DNSSEC algorithm: {0}")]
    UnsupportedAlgorithm(u8),

    #[error("Unsupported digest type: {0}")]
    UnsupportedDigestType(u8),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl DomainError {
    pub fn is_bogus(&self) -> bool {
        matches!(self, DomainError::DnssecValidationFailed(_))
    }
}

/// Failures of a single NSEC zone walk. None of them is fatal to the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalkError {
    #[error("resolution failed at {name}: {source}")]
    Resolution { name: String, source: DomainError },

    #[error("answer for {0} was not DNSSEC-authenticated")]
    NotAuthenticated(String),

    #[error("no NSEC record returned for {0} (zone walking unsupported)")]
    NoNsec(String),

    #[error("protocol violation: NSEC at {current} points to non-increasing name {next}")]
    ProtocolViolation { current: String, next: String },

    #[error("walk exceeded the step limit of {0}")]
    StepLimitExceeded(usize),
}

impl WalkError {
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            WalkError::ProtocolViolation { .. } | WalkError::StepLimitExceeded(_)
        )
    }
}
