//! Per-connection handling.
//!
//! Each accepted socket gets an independent task: read one line, dispatch it
//! through the shared [`Registry`], write one line back, flush, repeat.
//! Commands within a connection are strictly serialized — there is no
//! pipelining.

use crate::commands::Registry;
use crate::store::Store;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

/// Refuse to buffer more than this many bytes for a single line.
const MAX_LINE_SIZE: usize = 64 * 1024;

/// Connection-handling statistics, shared across all connections.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    pub connections_accepted: AtomicU64,
    pub active_connections: AtomicU64,
    pub commands_processed: AtomicU64,
    pub bytes_read: AtomicU64,
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written.fetch_add(count as u64, Ordering::Relaxed);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("client disconnected")]
    ClientDisconnected,
    #[error("line exceeded maximum size")]
    LineTooLong,
}

/// Runs one command line through the registry, honoring the two lines the
/// front-end handles itself (`PING`, `EXIT`). Returns `None` for a blank
/// line, which produces no response; `Some((response, should_close))`
/// otherwise.
pub fn dispatch_line(store: &Store, registry: &Registry, line: &str) -> Option<(String, bool)> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut tokens = trimmed.split_whitespace();
    let command = tokens.next().unwrap().to_uppercase();
    let args: Vec<String> = tokens.map(str::to_string).collect();

    match command.as_str() {
        "PING" => Some(("PONG".to_string(), false)),
        "EXIT" => Some(("BYE".to_string(), true)),
        _ => match registry.get(command.as_str()) {
            Some(handler) => match handler(store, &args) {
                Ok(result) => Some((result, false)),
                Err(e) => Some((format!("ERR {}", e), false)),
            },
            None => Some(("ERR unknown command".to_string(), false)),
        },
    }
}

pub struct ConnectionHandler {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    addr: SocketAddr,
    store: Arc<Store>,
    registry: Arc<Registry>,
    stats: Arc<ConnectionStats>,
}

impl ConnectionHandler {
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        store: Arc<Store>,
        registry: Arc<Registry>,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
            addr,
            store,
            registry,
            stats,
        }
    }

    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "client disconnected gracefully"),
            Err(ConnectionError::ClientDisconnected) => {
                debug!(client = %self.addr, "client disconnected")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "connection error"),
        }

        self.stats.connection_closed();
        result
    }

    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        let mut line = String::new();
        loop {
            line.clear();
            let n = self.reader.read_line(&mut line).await?;
            if n == 0 {
                return Err(ConnectionError::ClientDisconnected);
            }
            if line.len() > MAX_LINE_SIZE {
                return Err(ConnectionError::LineTooLong);
            }
            self.stats.bytes_read(n);

            let Some((response, should_close)) = dispatch_line(&self.store, &self.registry, &line)
            else {
                continue;
            };

            self.stats.command_processed();
            self.send_response(&response).await?;

            if should_close {
                return Ok(());
            }
        }
    }

    async fn send_response(&mut self, response: &str) -> Result<(), ConnectionError> {
        self.writer.write_all(response.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        self.stats.bytes_written(response.len() + 1);
        trace!(client = %self.addr, bytes = response.len() + 1, "sent response");
        Ok(())
    }
}

/// Creates a [`ConnectionHandler`] and runs it to completion.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    store: Arc<Store>,
    registry: Arc<Registry>,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, store, registry, stats);
    if let Err(e) = handler.run().await {
        if !matches!(e, ConnectionError::ClientDisconnected) {
            debug!(client = %addr, error = %e, "connection ended with error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::build_registry;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    async fn create_test_server() -> (SocketAddr, Arc<Store>, Arc<ConnectionStats>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let store = Arc::new(Store::new());
        let registry = Arc::new(build_registry());
        let stats = Arc::new(ConnectionStats::new());

        let store_clone = Arc::clone(&store);
        let stats_clone = Arc::clone(&stats);
        tokio::spawn(async move {
            while let Ok((stream, client_addr)) = listener.accept().await {
                tokio::spawn(handle_connection(
                    stream,
                    client_addr,
                    Arc::clone(&store_clone),
                    Arc::clone(&registry),
                    Arc::clone(&stats_clone),
                ));
            }
        });

        (addr, store, stats)
    }

    async fn read_line(stream: &mut TcpStream) -> String {
        let mut buf = [0u8; 256];
        let n = stream.read(&mut buf).await.unwrap();
        String::from_utf8_lossy(&buf[..n]).to_string()
    }

    #[tokio::test]
    async fn test_ping_pong() {
        let (addr, _, _) = create_test_server().await;
        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"PING\n").await.unwrap();
        assert_eq!(read_line(&mut client).await, "PONG\n");
    }

    #[tokio::test]
    async fn test_set_get() {
        let (addr, _, _) = create_test_server().await;
        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"SET name Ariz\n").await.unwrap();
        assert_eq!(read_line(&mut client).await, "OK\n");
        client.write_all(b"GET name\n").await.unwrap();
        assert_eq!(read_line(&mut client).await, "Ariz\n");
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let (addr, _, _) = create_test_server().await;
        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"FROBNICATE\n").await.unwrap();
        assert_eq!(read_line(&mut client).await, "ERR unknown command\n");
    }

    #[tokio::test]
    async fn test_arity_error_is_wire_formatted() {
        let (addr, _, _) = create_test_server().await;
        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"SET onlykey\n").await.unwrap();
        assert_eq!(read_line(&mut client).await, "ERR missing argument for SET\n");
    }

    #[tokio::test]
    async fn test_exit_closes_connection() {
        let (addr, _, _) = create_test_server().await;
        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"EXIT\n").await.unwrap();
        assert_eq!(read_line(&mut client).await, "BYE\n");
        let mut buf = [0u8; 8];
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_connection_stats() {
        let (addr, _, stats) = create_test_server().await;
        let mut client = TcpStream::connect(addr).await.unwrap();
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 1);
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 1);

        client.write_all(b"PING\n").await.unwrap();
        let _ = read_line(&mut client).await;
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        assert!(stats.commands_processed.load(Ordering::Relaxed) >= 1);

        drop(client);
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);
    }
}
