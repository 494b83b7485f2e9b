// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw TCP delivery to receipt printers (JetDirect, port 9100).
//
// Open a socket, write the command stream, flush, close.  There is no
// protocol negotiation and no acknowledgement beyond the TCP write
// succeeding.  One attempt per call; retrying is the caller's business.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

use printgate_core::error::{PrintgateError, Result};

/// Default bound on connecting and on writing.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Byte delivery to a printer address (`host:port`).
#[async_trait]
pub trait PrinterTransport: Send + Sync {
    /// Deliver `data` and return once it has been written and flushed.
    async fn send(&self, addr: &str, data: &[u8]) -> Result<()>;
}

/// Plain TCP transport with bounded connect and write times.
#[derive(Debug, Clone)]
pub struct RawTcpTransport {
    timeout: Duration,
}

impl RawTcpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for RawTcpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl PrinterTransport for RawTcpTransport {
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    async fn send(&self, addr: &str, data: &[u8]) -> Result<()> {
        let io_error = |source: std::io::Error| PrintgateError::Transport {
            addr: addr.to_string(),
            source,
        };
        let timed_out = |_| PrintgateError::Timeout {
            addr: addr.to_string(),
            after: self.timeout,
        };

        debug!("connecting via raw TCP");
        let mut stream = timeout(self.timeout, TcpStream::connect(addr))
            .await
            .map_err(timed_out)?
            .map_err(io_error)?;

        timeout(self.timeout, async {
            stream.write_all(data).await?;
            stream.flush().await?;
            stream.shutdown().await
        })
        .await
        .map_err(timed_out)?
        .map_err(io_error)?;

        info!("print data delivered");
        Ok(())
    }
}

/// Transport that records what it is asked to send instead of sending it.
///
/// Used by tests across the workspace.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, Vec<u8>)>>,
    fail_with: Option<std::io::ErrorKind>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose every send fails with `kind`, after recording it.
    pub fn failing(kind: std::io::ErrorKind) -> Self {
        Self {
            sent: Mutex::default(),
            fail_with: Some(kind),
        }
    }

    /// Every `(addr, bytes)` pair seen so far.
    pub fn sent(&self) -> Vec<(String, Vec<u8>)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PrinterTransport for RecordingTransport {
    async fn send(&self, addr: &str, data: &[u8]) -> Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((addr.to_string(), data.to_vec()));
        }
        match self.fail_with {
            Some(kind) => Err(PrintgateError::Transport {
                addr: addr.to_string(),
                source: kind.into(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    use printgate_core::error::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn delivers_exact_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr").to_string();

        let receiver = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.expect("read");
            received
        });

        let payload = vec![0x1B, 0x40, b'h', b'i', b'\n', 0x1D, 0x56, 0x00];
        RawTcpTransport::default()
            .send(&addr, &payload)
            .await
            .expect("send");

        assert_eq!(receiver.await.expect("join"), payload);
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr").to_string();
        drop(listener);

        let err = RawTcpTransport::new(Duration::from_secs(2))
            .send(&addr, b"x")
            .await
            .expect_err("nothing listening");
        match err {
            PrintgateError::Transport { addr: a, source } => {
                assert_eq!(a, addr);
                assert_eq!(source.kind(), std::io::ErrorKind::ConnectionRefused);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn stalled_write_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr").to_string();

        // Accept and hold the socket without reading so the send buffers fill.
        let holder = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.expect("accept");
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let limit = Duration::from_millis(200);
        let payload = vec![0u8; 64 * 1024 * 1024];
        let err = RawTcpTransport::new(limit)
            .send(&addr, &payload)
            .await
            .expect_err("peer never reads");
        holder.abort();

        assert_eq!(err.kind(), ErrorKind::Transport);
        match err {
            PrintgateError::Timeout { addr: a, after } => {
                assert_eq!(a, addr);
                assert_eq!(after, limit);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn recording_transport_records_and_can_fail() {
        let ok = RecordingTransport::new();
        ok.send("10.0.0.1:9100", b"abc").await.expect("send");
        assert_eq!(ok.sent(), vec![("10.0.0.1:9100".to_string(), b"abc".to_vec())]);

        let failing = RecordingTransport::failing(std::io::ErrorKind::ConnectionRefused);
        assert!(failing.send("10.0.0.1:9100", b"abc").await.is_err());
        assert_eq!(failing.sent().len(), 1);
    }
}
