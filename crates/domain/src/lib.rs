//! dsbootstrap domain layer
pub mod config;
pub mod delegation;
pub mod directive;
pub mod dns_query;
pub mod dns_record;
pub mod ds_record;
pub mod errors;
pub mod key_state;
pub mod name;
pub mod scan_stats;
pub mod signaling;

pub use config::{
    BootstrapConfig, CliOverrides, Config, ConfigError, LoggingConfig, MalformedInputPolicy,
    QuorumThreshold, ResolverConfig, ServerAddress,
};
pub use delegation::{Delegation, DelegationOutcome, DelegationState, SkipReason, Stage};
pub use directive::{AncestorScanRequest, Directive};
pub use dns_query::DnsQuery;
pub use dns_record::{
    DnskeyData, DsData, NsecData, RecordData, RecordType, ResourceRecord, RrsigData,
};
pub use ds_record::DsRecord;
pub use errors::{DomainError, WalkError};
pub use key_state::KeyState;
pub use name::DomainName;
pub use scan_stats::ScanStats;
pub use signaling::{signaling_hash, SignalingScheme};
