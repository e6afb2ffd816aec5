// Entropy Engine Stream - Resilient transport
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Resilient TCP transport with sample-and-hold semantics.
//!
//! A background reader task connects, splits the byte stream into lines,
//! decodes them and stores the newest value in a [`LatestValue`] cell.
//! On any failure it closes the socket, backs off and reconnects, forever.
//! The tick loop calls [`TcpTransport::next`], which only reads the cell
//! and therefore never blocks.

use crate::codec::{LineBuffer, DEFAULT_MAX_LINE_LEN};
use crate::error::TransportError;
use entropy_engine::SampleSource;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// Transport configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportConfig {
    /// `host:port` to connect to.
    pub addr: String,
    pub connect_timeout: Duration,
    /// Pause between a failure and the next connect attempt.
    pub reconnect_backoff: Duration,
    /// Returned by `next()` until the first value arrives.
    pub default_value: f64,
    pub max_line_len: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9009".to_string(),
            connect_timeout: Duration::from_secs(5),
            reconnect_backoff: Duration::from_millis(500),
            default_value: 0.0,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

impl TransportConfig {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    pub fn with_reconnect_backoff(mut self, backoff: Duration) -> Self {
        self.reconnect_backoff = backoff;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_default_value(mut self, value: f64) -> Self {
        self.default_value = value;
        self
    }

    pub fn with_max_line_len(mut self, len: usize) -> Self {
        self.max_line_len = len;
        self
    }
}

/// Single-writer cell holding the newest sample.
#[derive(Debug)]
pub struct LatestValue {
    bits: AtomicU64,
    has_value: AtomicBool,
}

impl LatestValue {
    /// Cell that reads as `default` until the first store.
    pub fn new(default: f64) -> Self {
        Self {
            bits: AtomicU64::new(default.to_bits()),
            has_value: AtomicBool::new(false),
        }
    }

    pub fn store(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Release);
        self.has_value.store(true, Ordering::Release);
    }

    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Whether any value has been stored.
    pub fn has_value(&self) -> bool {
        self.has_value.load(Ordering::Acquire)
    }

    /// Stored value, `None` before the first one.
    pub fn get(&self) -> Option<f64> {
        self.has_value().then(|| self.load())
    }
}

/// Counters maintained by the reader task.
#[derive(Debug, Default)]
pub struct TransportStats {
    pub connects: AtomicU64,
    pub disconnects: AtomicU64,
    pub lines_accepted: AtomicU64,
    pub lines_malformed: AtomicU64,
    pub connected: AtomicBool,
}

/// Point-in-time copy of [`TransportStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    pub connects: u64,
    pub disconnects: u64,
    pub lines_accepted: u64,
    pub lines_malformed: u64,
    pub connected: bool,
}

impl TransportStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            connects: self.connects.load(Ordering::SeqCst),
            disconnects: self.disconnects.load(Ordering::SeqCst),
            lines_accepted: self.lines_accepted.load(Ordering::SeqCst),
            lines_malformed: self.lines_malformed.load(Ordering::SeqCst),
            connected: self.connected.load(Ordering::SeqCst),
        }
    }

    fn on_connect(&self) {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.connected.store(true, Ordering::SeqCst);
    }

    fn on_disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
    }
}

/// Sample-and-hold TCP client.
#[derive(Debug)]
pub struct TcpTransport {
    latest: Arc<LatestValue>,
    stats: Arc<TransportStats>,
    shutdown: watch::Sender<bool>,
    reader: Option<JoinHandle<()>>,
}

impl TcpTransport {
    /// Start the background reader. Must be called inside a tokio runtime.
    pub fn spawn(config: TransportConfig) -> Self {
        let latest = Arc::new(LatestValue::new(config.default_value));
        let stats = Arc::new(TransportStats::default());
        let (shutdown, shutdown_rx) = watch::channel(false);

        let reader = tokio::spawn(run_reader(
            config,
            Arc::clone(&latest),
            Arc::clone(&stats),
            shutdown_rx,
        ));

        Self {
            latest,
            stats,
            shutdown,
            reader: Some(reader),
        }
    }

    /// Newest value, or the configured default before any arrived.
    /// Never blocks.
    pub fn next(&self) -> f64 {
        self.latest.load()
    }

    /// Newest value, `None` before any arrived.
    pub fn latest(&self) -> Option<f64> {
        self.latest.get()
    }

    pub fn stats(&self) -> Arc<TransportStats> {
        Arc::clone(&self.stats)
    }

    pub fn is_connected(&self) -> bool {
        self.stats.connected.load(Ordering::SeqCst)
    }

    /// Close the socket and wait for the reader to exit.
    pub async fn stop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(reader) = self.reader.take() {
            if let Err(e) = reader.await {
                warn!("Transport reader ended abnormally: {}", e);
            }
        }
    }
}

impl SampleSource for TcpTransport {
    fn next_sample(&mut self) -> Option<f64> {
        Some(self.next())
    }

    fn name(&self) -> &str {
        "tcp"
    }
}

/// Reconnect loop. Exits only on shutdown or when the transport is dropped.
async fn run_reader(
    config: TransportConfig,
    latest: Arc<LatestValue>,
    stats: Arc<TransportStats>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Transport reader started for {}", config.addr);

    loop {
        if *shutdown.borrow() {
            break;
        }

        let outcome = tokio::select! {
            _ = shutdown.changed() => break,
            r = read_session(&config, &latest, &stats) => r,
        };

        match outcome {
            Err(TransportError::Closed) => info!("Disconnected from {}", config.addr),
            Err(e @ TransportError::Io(_)) => warn!("Connection to {} lost: {}", config.addr, e),
            Err(e) => debug!("{}", e),
            Ok(()) => {}
        }

        tokio::select! {
            _ = shutdown.changed() => break,
            _ = sleep(config.reconnect_backoff) => {}
        }
    }

    // A session cut short by shutdown still counts as a disconnect
    if stats.connected.load(Ordering::SeqCst) {
        stats.on_disconnect();
    }
    info!("Transport reader stopped");
}

/// One connection: connect, then read until the peer closes or errors.
async fn read_session(
    config: &TransportConfig,
    latest: &LatestValue,
    stats: &TransportStats,
) -> Result<(), TransportError> {
    let mut stream = timeout(config.connect_timeout, TcpStream::connect(&config.addr))
        .await
        .map_err(|_| TransportError::Timeout(config.connect_timeout))?
        .map_err(|source| TransportError::Connect {
            addr: config.addr.clone(),
            source,
        })?;

    stats.on_connect();
    info!("Connected to {}", config.addr);

    let mut lines = LineBuffer::new(config.max_line_len);
    let mut buf = [0u8; 4096];
    let result = loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) => break Err(TransportError::Closed),
            Ok(n) => n,
            Err(e) => break Err(TransportError::Io(e)),
        };
        for decoded in lines.feed(&buf[..n]) {
            match decoded {
                Ok(value) => {
                    latest.store(value);
                    stats.lines_accepted.fetch_add(1, Ordering::SeqCst);
                }
                Err(e) => {
                    stats.lines_malformed.fetch_add(1, Ordering::SeqCst);
                    debug!("Discarding line: {}", e);
                }
            }
        }
    };

    stats.on_disconnect();
    result
}
