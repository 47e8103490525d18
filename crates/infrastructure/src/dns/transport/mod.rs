pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use dsboot_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;

/// Result of a raw DNS transport operation
#[derive(Debug)]
pub struct TransportResponse {
    /// Raw DNS response bytes (wire format)
    pub bytes: Vec<u8>,
    pub protocol_used: &'static str,
}

/// Sends raw DNS messages over the wire
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

/// Enum-dispatched transport, so the resolver never boxes per query.
pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
}

impl Transport {
    pub fn udp(server: SocketAddr, edns_payload: u16) -> Self {
        Self::Udp(udp::UdpTransport::new(server, edns_payload))
    }

    pub fn tcp(server: SocketAddr) -> Self {
        Self::Tcp(tcp::TcpTransport::new(server))
    }

    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(t) => DnsTransport::protocol_name(t),
            Self::Tcp(t) => DnsTransport::protocol_name(t),
        }
    }
}

/// Maps an I/O failure on the wire into the domain error space.
pub(crate) fn io_error(action: &str, server: SocketAddr, e: std::io::Error) -> DomainError {
    DomainError::Transport(format!("{} {}: {}", action, server, e))
}
