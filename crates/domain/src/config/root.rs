use super::{BootstrapConfig, ConfigError, LoggingConfig, ResolverConfig};
use crate::config::QuorumThreshold;
use crate::SignalingScheme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub servers: Vec<String>,
    pub workers: Option<usize>,
    pub auth_quorum: Option<QuorumThreshold>,
    pub signaling_scheme: Option<SignalingScheme>,
    pub verbosity: u8,
}

impl Config {
    /// Loads the config file (when given) and applies CLI overrides.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(Path::new(path))?,
            None => Self::default(),
        };
        config.apply(overrides);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn apply(&mut self, overrides: CliOverrides) {
        if !overrides.servers.is_empty() {
            self.resolver.servers = overrides.servers;
        }
        if let Some(workers) = overrides.workers {
            self.bootstrap.workers = workers;
        }
        if let Some(quorum) = overrides.auth_quorum {
            self.bootstrap.auth_quorum = quorum;
        }
        if let Some(scheme) = overrides.signaling_scheme {
            self.bootstrap.signaling_scheme = scheme;
        }
        match overrides.verbosity {
            0 => {}
            1 => self.logging.level = "info".to_string(),
            _ => self.logging.level = "debug".to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.bootstrap.workers == 0 {
            return invalid("bootstrap.workers must be at least 1");
        }
        if self.bootstrap.walk_concurrency == 0 {
            return invalid("bootstrap.walk_concurrency must be at least 1");
        }
        if self.bootstrap.walk_step_limit == 0 {
            return invalid("bootstrap.walk_step_limit must be at least 1");
        }
        if self.resolver.attempts == 0 {
            return invalid("resolver.attempts must be at least 1");
        }
        if self.resolver.timeout_ms == 0 {
            return invalid("resolver.timeout_ms must be positive");
        }
        if self.resolver.edns_payload < 512 {
            return invalid("resolver.edns_payload must be at least 512");
        }
        self.resolver.server_addresses()?;
        Ok(())
    }
}
