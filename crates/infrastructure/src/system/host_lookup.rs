use dsboot_domain::{DomainError, ServerAddress};
use std::net::SocketAddr;
use tokio::net::lookup_host;
use tracing::debug;

/// Turns configured resolvers into socket addresses, asking the system
/// resolver for host names. Every address of a host is kept, in the order
/// the system returns them.
pub async fn lookup_servers(servers: &[ServerAddress]) -> Result<Vec<SocketAddr>, DomainError> {
    let mut addrs = Vec::with_capacity(servers.len());
    for server in servers {
        match server {
            ServerAddress::Socket(addr) => addrs.push(*addr),
            ServerAddress::Host { name, port } => {
                let found: Vec<SocketAddr> = lookup_host((name.as_str(), *port))
                    .await
                    .map_err(|e| {
                        DomainError::Transport(format!(
                            "Failed to look up resolver {}: {}",
                            server, e
                        ))
                    })?
                    .collect();
                if found.is_empty() {
                    return Err(DomainError::Transport(format!(
                        "resolver {} has no addresses",
                        server
                    )));
                }
                debug!(resolver = %server, addresses = ?found, "Resolver host looked up");
                addrs.extend(found);
            }
        }
    }
    Ok(addrs)
}
