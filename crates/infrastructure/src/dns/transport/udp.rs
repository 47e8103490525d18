use super::{io_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use dsboot_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Smallest payload every DNS server may send over UDP (RFC 1035).
const MIN_UDP_PAYLOAD: u16 = 512;

/// DNS over UDP, one ephemeral socket per query.
pub struct UdpTransport {
    server_addr: SocketAddr,
    /// Receive buffer size; matches the advertised EDNS payload so any
    /// answer the server is allowed to send fits. Larger answers come back
    /// truncated and are retried over TCP.
    max_response: usize,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr, edns_payload: u16) -> Self {
        Self {
            server_addr,
            max_response: usize::from(edns_payload.max(MIN_UDP_PAYLOAD)),
        }
    }

    fn bind_addr(&self) -> SocketAddr {
        if self.server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<TransportResponse, DomainError> {
        let socket = UdpSocket::bind(self.bind_addr())
            .await
            .map_err(|e| io_error("Failed to bind UDP socket for", self.server_addr, e))?;

        // connect() makes the kernel drop datagrams from other sources
        socket
            .connect(self.server_addr)
            .await
            .map_err(|e| io_error("Failed to connect UDP socket to", self.server_addr, e))?;

        let bytes_sent = socket
            .send(message_bytes)
            .await
            .map_err(|e| io_error("Failed to send UDP query to", self.server_addr, e))?;

        debug!(server = %self.server_addr, bytes_sent, "UDP query sent");

        // One spare byte tells an exactly-full answer from an oversized one
        let mut recv_buf = vec![0u8; self.max_response + 1];
        let bytes_received = socket
            .recv(&mut recv_buf)
            .await
            .map_err(|e| io_error("Failed to receive UDP response from", self.server_addr, e))?;

        if bytes_received > self.max_response {
            warn!(
                server = %self.server_addr,
                limit = self.max_response,
                "UDP response exceeds the advertised payload size and may be cut short"
            );
        }

        recv_buf.truncate(bytes_received);

        debug!(server = %self.server_addr, bytes_received, "UDP response received");

        Ok(TransportResponse {
            bytes: recv_buf,
            protocol_used: "UDP",
        })
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| DomainError::QueryTimeout)?
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
