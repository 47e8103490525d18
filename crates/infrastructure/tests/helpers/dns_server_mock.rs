use super::wire::{encode_reply, parse_query, ParsedQuery, Reply};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

type Handler = Arc<dyn Fn(&ParsedQuery) -> Reply + Send + Sync>;

/// Local DNS server answering UDP and TCP on the same port from a
/// handler closure. Every query it receives is recorded.
pub struct MockDnsServer {
    addr: SocketAddr,
    queries: Arc<Mutex<Vec<ParsedQuery>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&ParsedQuery) -> Reply + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        let udp = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = udp.local_addr().unwrap();
        let tcp = TcpListener::bind(addr).await.unwrap();

        let queries = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let log = Arc::clone(&queries);
        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = udp.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        let query = parse_query(&buf[..len], false);
                        log.lock().unwrap().push(query.clone());
                        let reply = handler(&query);
                        if !reply.silent {
                            let response = encode_reply(&buf[..len], &reply);
                            let _ = udp.send_to(&response, peer).await;
                        }
                    }
                    accepted = tcp.accept() => {
                        let Ok((mut stream, _)) = accepted else { continue };
                        let handler = Arc::clone(&handler);
                        let log = Arc::clone(&log);
                        tokio::spawn(async move {
                            let mut len_buf = [0u8; 2];
                            if stream.read_exact(&mut len_buf).await.is_err() {
                                return;
                            }
                            let mut msg = vec![0u8; u16::from_be_bytes(len_buf) as usize];
                            if stream.read_exact(&mut msg).await.is_err() {
                                return;
                            }
                            let query = parse_query(&msg, true);
                            log.lock().unwrap().push(query.clone());
                            let reply = handler(&query);
                            if reply.silent {
                                return;
                            }
                            let response = encode_reply(&msg, &reply);
                            let mut framed = (response.len() as u16).to_be_bytes().to_vec();
                            framed.extend_from_slice(&response);
                            let _ = stream.write_all(&framed).await;
                        });
                    }
                }
            }
        });

        Self {
            addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries(&self) -> Vec<ParsedQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
