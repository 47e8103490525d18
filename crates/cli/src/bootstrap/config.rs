use dsboot_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;
    Ok(config)
}

/// Logged once the subscriber is up, since loading happens before it.
pub fn log_config(config_path: Option<&str>, config: &Config) {
    info!(
        config_file = config_path.unwrap_or("default"),
        workers = config.bootstrap.workers,
        walk_concurrency = config.bootstrap.walk_concurrency,
        quorum = %config.bootstrap.auth_quorum,
        scheme = %config.bootstrap.signaling_scheme,
        check_existing_ds = config.bootstrap.check_existing_ds,
        "Configuration loaded"
    );
}
