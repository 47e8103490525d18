use super::ConfigError;
use crate::DomainName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DNS_PORT: u16 = 53;

/// Upstream validating resolver settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Resolvers as "192.0.2.53", "[2001:db8::53]:5353", "resolver.example"
    /// or "resolver.example:5353"; host names are looked up at startup.
    /// Empty means: use the nameservers from /etc/resolv.conf.
    #[serde(default)]
    pub servers: Vec<String>,

    /// Timeout per attempt in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Attempts per query, rotating through the servers
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Advertised EDNS(0) UDP payload size
    #[serde(default = "default_edns_payload")]
    pub edns_payload: u16,
}

/// A configured resolver, before any host name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerAddress {
    Socket(SocketAddr),
    Host { name: String, port: u16 },
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerAddress::Socket(addr) => write!(f, "{}", addr),
            ServerAddress::Host { name, port } => write!(f, "{}:{}", name, port),
        }
    }
}

impl ResolverConfig {
    /// Parses `servers`, defaulting the port to 53.
    pub fn server_addresses(&self) -> Result<Vec<ServerAddress>, ConfigError> {
        self.servers
            .iter()
            .map(|s| parse_server(s))
            .collect()
    }
}

pub fn parse_server(server: &str) -> Result<ServerAddress, ConfigError> {
    let invalid = || ConfigError::Invalid(format!("invalid resolver address: {}", server));
    let server = server.trim();

    if let Ok(addr) = server.parse::<SocketAddr>() {
        return Ok(ServerAddress::Socket(addr));
    }
    if let Ok(ip) = server
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
    {
        return Ok(ServerAddress::Socket(SocketAddr::new(ip, DNS_PORT)));
    }

    let (host, port) = match server.rsplit_once(':') {
        Some((host, port)) => (host, port.parse::<u16>().map_err(|_| invalid())?),
        None => (server, DNS_PORT),
    };
    // brackets and further colons only belong to IPv6 literals
    if host.contains([':', '[', ']']) {
        return Err(invalid());
    }
    let name = host.trim_end_matches('.');
    if name.is_empty() {
        return Err(invalid());
    }
    DomainName::parse(name).map_err(|_| invalid())?;
    Ok(ServerAddress::Host {
        name: name.to_string(),
        port,
    })
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            servers: vec![],
            timeout_ms: default_timeout_ms(),
            attempts: default_attempts(),
            edns_payload: default_edns_payload(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_attempts() -> u32 {
    3
}

fn default_edns_payload() -> u16 {
    1232
}
