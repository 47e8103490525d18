use super::forwarding::{DnsResponse, MessageBuilder, QueryFlags, ResponseParser};
use super::transport::Transport;
use async_trait::async_trait;
use dsboot_application::ports::{DnsAnswer, DnsResolver, NameserverQuery};
use dsboot_domain::{DnsQuery, DomainError, DomainName, RecordType, ResolverConfig};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Connection settings for the upstream validating resolver.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub servers: Vec<SocketAddr>,
    pub timeout: Duration,
    pub attempts: u32,
    pub edns_payload: u16,
    /// Port of the zones' authoritative nameservers
    pub authoritative_port: u16,
}

impl ResolverOptions {
    pub fn new(servers: Vec<SocketAddr>, config: &ResolverConfig) -> Self {
        Self {
            servers,
            timeout: Duration::from_millis(config.timeout_ms),
            attempts: config.attempts.max(1),
            edns_payload: config.edns_payload,
            authoritative_port: 53,
        }
    }
}

/// Sends every query to a DNSSEC-validating recursive resolver and trusts
/// its AD bit. Servers are used round-robin; each attempt goes to the next
/// one.
pub struct UpstreamResolver {
    options: ResolverOptions,
    next_server: AtomicUsize,
}

impl UpstreamResolver {
    pub fn new(options: ResolverOptions) -> Result<Self, DomainError> {
        if options.servers.is_empty() {
            return Err(DomainError::Transport(
                "no upstream resolver configured".to_string(),
            ));
        }
        Ok(Self {
            options,
            next_server: AtomicUsize::new(0),
        })
    }

    fn pick_server(&self) -> SocketAddr {
        let index = self.next_server.fetch_add(1, Ordering::Relaxed);
        self.options.servers[index % self.options.servers.len()]
    }

    /// Runs up to `attempts` exchanges, moving to the next server after
    /// each failure.
    async fn query(
        &self,
        query: &DnsQuery,
        checking_disabled: bool,
    ) -> Result<DnsResponse, DomainError> {
        let flags = QueryFlags {
            edns_payload: self.options.edns_payload,
            checking_disabled,
            ..QueryFlags::default()
        };
        let mut last_error = DomainError::QueryTimeout;

        for attempt in 1..=self.options.attempts {
            let server = self.pick_server();
            match self.exchange(server, query, flags).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    debug!(
                        query = %query,
                        server = %server,
                        attempt,
                        error = %e,
                        "Upstream query attempt failed"
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn exchange(
        &self,
        server: SocketAddr,
        query: &DnsQuery,
        flags: QueryFlags,
    ) -> Result<DnsResponse, DomainError> {
        let start = Instant::now();
        let (id, query_bytes) = MessageBuilder::build_query(query, flags)?;

        let udp = Transport::udp(server, flags.edns_payload);
        let response = udp.send(&query_bytes, self.options.timeout).await?;
        let parsed = Self::parse_matching(id, &response.bytes)?;

        if !parsed.truncated {
            return Ok(parsed);
        }

        let tcp = Transport::tcp(server);
        debug!(
            server = %server,
            query = %query,
            from = udp.protocol_name(),
            to = tcp.protocol_name(),
            "Response truncated (TC bit), retrying"
        );

        let remaining = self
            .options
            .timeout
            .checked_sub(start.elapsed())
            .unwrap_or(Duration::from_millis(500));
        let response = tcp.send(&query_bytes, remaining).await?;
        debug!(
            server = %server,
            protocol = response.protocol_used,
            bytes = response.bytes.len(),
            "Retried query answered"
        );
        Self::parse_matching(id, &response.bytes)
    }

    fn parse_matching(id: u16, bytes: &[u8]) -> Result<DnsResponse, DomainError> {
        let response = ResponseParser::parse(bytes)?;
        if response.id != id {
            return Err(DomainError::InvalidDnsResponse(format!(
                "response id {} does not match query id {}",
                response.id, id
            )));
        }
        Ok(response)
    }

    /// A and AAAA addresses of `nameserver`, looked up through the
    /// validating resolver.
    async fn nameserver_addresses(
        &self,
        nameserver: &DomainName,
    ) -> Result<Vec<SocketAddr>, DomainError> {
        let mut addrs = Vec::new();
        for record_type in [RecordType::A, RecordType::AAAA] {
            let answer = self
                .resolve(&DnsQuery::new(nameserver.clone(), record_type))
                .await?;
            addrs.extend(
                answer
                    .addresses(nameserver)
                    .into_iter()
                    .map(|ip| SocketAddr::new(ip, self.options.authoritative_port)),
            );
        }
        Ok(addrs)
    }

    /// A SERVFAIL from a validating resolver is either an outage or bogus
    /// data. Asking again with CD set tells them apart: if the unchecked
    /// query succeeds, validation is what failed.
    async fn classify_server_failure(&self, query: &DnsQuery) -> DomainError {
        match self.query(query, true).await {
            Ok(unchecked) if !unchecked.is_error() => {
                warn!(query = %query, "Resolver reports bogus DNSSEC data");
                DomainError::DnssecValidationFailed(format!(
                    "{} fails validation at the resolver",
                    query
                ))
            }
            Ok(_) | Err(_) => {
                DomainError::Transport(format!("{}: resolver returned SERVFAIL", query))
            }
        }
    }
}

#[async_trait]
impl DnsResolver for UpstreamResolver {
    async fn resolve(&self, query: &DnsQuery) -> Result<DnsAnswer, DomainError> {
        let response = self.query(query, false).await?;

        if response.is_server_failure() {
            return Err(self.classify_server_failure(query).await);
        }
        if response.is_error() {
            return Err(DomainError::Transport(format!(
                "{}: resolver returned {}",
                query, response.rcode
            )));
        }

        debug!(
            query = %query,
            answers = response.answers.len(),
            authenticated = response.authenticated,
            nxdomain = response.is_nxdomain(),
            "Query resolved"
        );

        Ok(response.into_answer())
    }
}

#[async_trait]
impl NameserverQuery for UpstreamResolver {
    /// Tries the nameserver's addresses in turn until one of them answers.
    async fn query_nameserver(
        &self,
        nameserver: &DomainName,
        query: &DnsQuery,
    ) -> Result<DnsAnswer, DomainError> {
        let addrs = self.nameserver_addresses(nameserver).await?;
        let flags = QueryFlags::authoritative(self.options.edns_payload);
        let mut last_error =
            DomainError::Transport(format!("nameserver {} has no addresses", nameserver));

        for server in addrs {
            match self.exchange(server, query, flags).await {
                Ok(response) if !response.is_error() => {
                    debug!(
                        query = %query,
                        nameserver = %nameserver,
                        server = %server,
                        answers = response.answers.len(),
                        "Nameserver answered directly"
                    );
                    return Ok(response.into_answer());
                }
                Ok(response) => {
                    last_error = DomainError::Transport(format!(
                        "{}: nameserver {} returned {}",
                        query, nameserver, response.rcode
                    ));
                }
                Err(e) => last_error = e,
            }
            debug!(
                query = %query,
                nameserver = %nameserver,
                server = %server,
                error = %last_error,
                "Nameserver address failed"
            );
        }

        Err(last_error)
    }
}
