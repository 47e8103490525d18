use super::{io_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use dsboot_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// DNS over TCP (RFC 1035 section 4.2.2): every message is preceded by a
/// two-octet big-endian length.
pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<TransportResponse, DomainError> {
        let length = u16::try_from(message_bytes.len()).map_err(|_| {
            DomainError::Transport(format!(
                "query of {} bytes is too large for TCP framing",
                message_bytes.len()
            ))
        })?;

        let mut stream = TcpStream::connect(self.server_addr)
            .await
            .map_err(|e| io_error("Failed to connect over TCP to", self.server_addr, e))?;

        let mut framed = Vec::with_capacity(message_bytes.len() + 2);
        framed.extend_from_slice(&length.to_be_bytes());
        framed.extend_from_slice(message_bytes);
        stream
            .write_all(&framed)
            .await
            .map_err(|e| io_error("Failed to send TCP query to", self.server_addr, e))?;

        debug!(server = %self.server_addr, bytes_sent = framed.len(), "TCP query sent");

        let mut length_buf = [0u8; 2];
        stream
            .read_exact(&mut length_buf)
            .await
            .map_err(|e| io_error("Failed to read TCP length from", self.server_addr, e))?;
        let response_len = u16::from_be_bytes(length_buf) as usize;

        let mut response = vec![0u8; response_len];
        stream
            .read_exact(&mut response)
            .await
            .map_err(|e| io_error("Failed to read TCP response from", self.server_addr, e))?;

        debug!(server = %self.server_addr, bytes_received = response_len, "TCP response received");

        Ok(TransportResponse {
            bytes: response,
            protocol_used: "TCP",
        })
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
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
        "TCP"
    }
}
