use dsboot_domain::DomainError;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use tracing::debug;

pub const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

/// Extracts `nameserver` entries from resolv.conf content. Comments,
/// unknown directives and unparsable addresses are ignored; IPv6 zone
/// identifiers (`fe80::1%eth0`) are dropped with the entry.
pub fn parse_resolv_conf(content: &str) -> Vec<SocketAddr> {
    content
        .lines()
        .map(|line| line.split(['#', ';']).next().unwrap_or_default())
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some("nameserver"), Some(addr)) => match addr.parse::<IpAddr>() {
                    Ok(ip) => Some(SocketAddr::new(ip, 53)),
                    Err(_) => {
                        debug!(entry = addr, "Ignoring unparsable nameserver entry");
                        None
                    }
                },
                _ => None,
            }
        })
        .collect()
}

/// Nameservers of the host, read from `/etc/resolv.conf` (or `path`).
pub fn system_nameservers(path: Option<&Path>) -> Result<Vec<SocketAddr>, DomainError> {
    let path = path.unwrap_or_else(|| Path::new(RESOLV_CONF_PATH));
    let content = std::fs::read_to_string(path).map_err(|e| {
        DomainError::Transport(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let servers = parse_resolv_conf(&content);
    if servers.is_empty() {
        return Err(DomainError::Transport(format!(
            "no nameserver entries in {}",
            path.display()
        )));
    }
    Ok(servers)
}
