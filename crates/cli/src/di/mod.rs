//! Wires the adapters into the use cases.

use anyhow::Context;
use dsboot_application::ports::{
    DnsResolver, DnssecVerifier, NameserverQuery, ParentalNsSource,
};
use dsboot_application::use_cases::BootstrapDelegationsUseCase;
use dsboot_domain::Config;
use dsboot_infrastructure::dns::{ResolverOptions, RingDnssecVerifier, UpstreamResolver};
use dsboot_infrastructure::parental::DnsParentalNsSource;
use dsboot_infrastructure::system::{lookup_servers, system_nameservers};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub struct Services {
    pub bootstrap: Arc<BootstrapDelegationsUseCase>,
}

impl Services {
    pub async fn build(config: &Config) -> anyhow::Result<Self> {
        let servers = resolver_addresses(config).await?;
        info!(
            servers = ?servers,
            timeout_ms = config.resolver.timeout_ms,
            attempts = config.resolver.attempts,
            "Using validating resolvers"
        );

        let upstream = Arc::new(UpstreamResolver::new(ResolverOptions::new(
            servers,
            &config.resolver,
        ))?);
        let resolver: Arc<dyn DnsResolver> = upstream.clone();
        let nameservers: Arc<dyn NameserverQuery> = upstream;
        let verifier: Arc<dyn DnssecVerifier> = Arc::new(RingDnssecVerifier::new());
        let parental_ns: Arc<dyn ParentalNsSource> =
            Arc::new(DnsParentalNsSource::new(Arc::clone(&resolver)));

        let bootstrap = Arc::new(BootstrapDelegationsUseCase::new(
            resolver,
            nameservers,
            verifier,
            parental_ns,
            &config.bootstrap,
        ));

        Ok(Self { bootstrap })
    }
}

/// Configured resolvers, host names looked up through the system resolver,
/// or the host's resolv.conf nameservers when none are configured.
async fn resolver_addresses(config: &Config) -> anyhow::Result<Vec<SocketAddr>> {
    let configured = config.resolver.server_addresses()?;
    if !configured.is_empty() {
        return Ok(lookup_servers(&configured).await?);
    }
    system_nameservers(None).context("no resolver configured and none found on the system")
}
