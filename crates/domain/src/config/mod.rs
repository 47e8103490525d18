//! Configuration module for dsbootstrap
//!
//! - `root`: main configuration, file loading and CLI overrides
//! - `resolver`: upstream validating resolver settings
//! - `bootstrap`: pipeline policy (quorum, walk bounds, worker pool)
//! - `logging`: logging settings
//! - `errors`: configuration errors

pub mod bootstrap;
pub mod errors;
pub mod logging;
pub mod resolver;
pub mod root;

pub use bootstrap::{BootstrapConfig, MalformedInputPolicy, QuorumThreshold};
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use resolver::{ResolverConfig, ServerAddress};
pub use root::{CliOverrides, Config};
