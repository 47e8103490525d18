use crate::SignalingScheme;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How many of a delegation's claimed nameservers must publish
/// authenticated, consistent bootstrap signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QuorumThreshold {
    AtLeast(usize),
    Majority,
    All,
}

impl QuorumThreshold {
    /// Number of responding nameservers required out of `claimed`.
    pub fn required(&self, claimed: usize) -> usize {
        match self {
            QuorumThreshold::AtLeast(n) => *n,
            QuorumThreshold::Majority => claimed / 2 + 1,
            QuorumThreshold::All => claimed,
        }
    }
}

impl Default for QuorumThreshold {
    fn default() -> Self {
        QuorumThreshold::AtLeast(1)
    }
}

impl FromStr for QuorumThreshold {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(QuorumThreshold::All),
            "majority" => Ok(QuorumThreshold::Majority),
            other => match other.parse::<usize>() {
                Ok(0) => Err("quorum must be at least 1".to_string()),
                Ok(n) => Ok(QuorumThreshold::AtLeast(n)),
                Err(_) => Err(format!(
                    "invalid quorum '{}': expected a number, \"majority\" or \"all\"",
                    other
                )),
            },
        }
    }
}

impl TryFrom<String> for QuorumThreshold {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QuorumThreshold> for String {
    fn from(value: QuorumThreshold) -> Self {
        value.to_string()
    }
}

impl fmt::Display for QuorumThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuorumThreshold::AtLeast(n) => write!(f, "{}", n),
            QuorumThreshold::Majority => f.write_str("majority"),
            QuorumThreshold::All => f.write_str("all"),
        }
    }
}

/// What to do with an input line that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedInputPolicy {
    /// Log a warning naming the line and continue with the rest.
    #[default]
    Skip,
    /// Reject the whole run before any query is issued.
    Abort,
}

impl FromStr for MalformedInputPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(MalformedInputPolicy::Skip),
            "abort" => Ok(MalformedInputPolicy::Abort),
            other => Err(format!("unknown malformed-input policy: {}", other)),
        }
    }
}

/// Bootstrap pipeline policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BootstrapConfig {
    /// Concurrent per-delegation pipelines
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Concurrent ancestor zone walks
    #[serde(default = "default_walk_concurrency")]
    pub walk_concurrency: usize,

    /// Maximum NSEC queries per zone walk
    #[serde(default = "default_walk_step_limit")]
    pub walk_step_limit: usize,

    #[serde(default)]
    pub auth_quorum: QuorumThreshold,

    #[serde(default)]
    pub signaling_scheme: SignalingScheme,

    /// Skip delegations that already have a DS RRset
    #[serde(default = "default_true")]
    pub check_existing_ds: bool,

    #[serde(default)]
    pub on_malformed_input: MalformedInputPolicy,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            walk_concurrency: default_walk_concurrency(),
            walk_step_limit: default_walk_step_limit(),
            auth_quorum: QuorumThreshold::default(),
            signaling_scheme: SignalingScheme::default(),
            check_existing_ds: true,
            on_malformed_input: MalformedInputPolicy::default(),
        }
    }
}

fn default_workers() -> usize {
    15
}

fn default_walk_concurrency() -> usize {
    4
}

fn default_walk_step_limit() -> usize {
    10_000
}

fn default_true() -> bool {
    true
}
