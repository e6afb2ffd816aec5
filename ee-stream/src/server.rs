// Entropy Engine Stream - Generator server
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Live generator output over TCP or stdout.
//!
//! The server accepts a single client and streams one line per emission
//! slot until the client disconnects, the configured runtime elapses or a
//! shutdown is signalled. The caller gets the final counters back and
//! prints them as the shutdown summary.

use crate::error::Result;
use ee_testdata::{Generator, GeneratorCounters, Pacer, StreamConfig, Value};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::time::sleep_until;
use tracing::{debug, info, warn};

/// Wire format for generated lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Bare value per line.
    #[default]
    Plain,
    /// `{"value": v}` per line.
    Json,
}

/// Render one value as a line, terminator included.
pub fn format_line(value: &Value, format: OutputFormat) -> String {
    match format {
        OutputFormat::Plain => format!("{}\n", value),
        OutputFormat::Json => format!("{}\n", serde_json::json!({ "value": value })),
    }
}

/// Why a live run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    RuntimeElapsed,
    Disconnected,
    Shutdown,
}

/// Drive `generator` in live mode, writing lines to `writer`.
pub async fn run_live<W>(
    generator: &mut Generator,
    format: OutputFormat,
    writer: &mut W,
    mut shutdown: watch::Receiver<bool>,
) -> Result<StopReason>
where
    W: AsyncWrite + Unpin,
{
    let config = generator.config().clone();
    let started = Instant::now();
    let mut pacer = Pacer::from_config(&config, started);

    for slot in 0u64.. {
        if *shutdown.borrow() {
            return Ok(StopReason::Shutdown);
        }
        if config.runtime_exceeded(started.elapsed()) {
            info!("Runtime of {}s elapsed", config.total_runtime);
            return Ok(StopReason::RuntimeElapsed);
        }

        let emission = generator.tick(slot);
        if let Some(value) = emission.value() {
            let line = format_line(&value, format);
            for _ in 0..emission.copies() {
                if let Err(e) = writer.write_all(line.as_bytes()).await {
                    return disconnect_or(e);
                }
            }
            if let Err(e) = writer.flush().await {
                return disconnect_or(e);
            }
        } else {
            debug!("Slot {} dropped", slot);
        }

        let now = Instant::now();
        pacer.mark_emitted(now);
        let target = pacer.next_target(Instant::now());
        tokio::select! {
            _ = sleep_until(target.into()) => {}
            _ = shutdown.changed() => return Ok(StopReason::Shutdown),
        }
    }

    Ok(StopReason::Shutdown)
}

fn disconnect_or(e: std::io::Error) -> Result<StopReason> {
    match e.kind() {
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted => {
            info!("Client disconnected");
            Ok(StopReason::Disconnected)
        }
        _ => Err(e.into()),
    }
}

/// Single-client TCP server for generator output.
#[derive(Debug)]
pub struct GeneratorServer {
    listener: TcpListener,
    generator: Generator,
    format: OutputFormat,
}

impl GeneratorServer {
    /// Validate `config` and bind `addr`.
    pub async fn bind(addr: &str, config: StreamConfig, format: OutputFormat) -> Result<Self> {
        let generator = Generator::new(config)?;
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            generator,
            format,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Wait for one client and stream to it until a stop condition.
    pub async fn serve(mut self, mut shutdown: watch::Receiver<bool>) -> Result<GeneratorCounters> {
        let config = self.generator.config();
        info!(
            "Generator listening on {} (datatype={}, uf={}, seed={}, clock={}s)",
            self.listener.local_addr()?,
            config.datatype,
            config.unexpected_factor,
            config.seed,
            config.clock_period
        );

        let (mut socket, peer) = tokio::select! {
            accepted = self.listener.accept() => accepted?,
            _ = shutdown.changed() => {
                info!("Shutdown before any client connected");
                return Ok(self.generator.counters());
            }
        };
        info!("Client connected: {}", peer);
        if let Err(e) = socket.set_nodelay(true) {
            warn!("Could not set TCP_NODELAY: {}", e);
        }

        let reason = run_live(&mut self.generator, self.format, &mut socket, shutdown).await?;
        info!("Generator stopped: {:?}", reason);
        Ok(self.generator.counters())
    }
}

/// Stream generator output to stdout.
pub async fn emit_stdout(
    config: StreamConfig,
    format: OutputFormat,
    shutdown: watch::Receiver<bool>,
) -> Result<GeneratorCounters> {
    let mut generator = Generator::new(config)?;
    let mut stdout = tokio::io::stdout();
    let reason = run_live(&mut generator, format, &mut stdout, shutdown).await?;
    info!("Generator stopped: {:?}", reason);
    Ok(generator.counters())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ee_testdata::Datatype;

    fn quick(uf: f64, runtime: f64) -> StreamConfig {
        StreamConfig::new()
            .with_unexpected_factor(uf)
            .with_clock_period(0.001)
            .with_total_runtime(runtime)
            .with_seed(3)
    }

    #[test]
    fn test_format_line() {
        assert_eq!(format_line(&Value::Number(0.5), OutputFormat::Plain), "0.5\n");
        assert_eq!(
            format_line(&Value::Number(0.5), OutputFormat::Json),
            "{\"value\":0.5}\n"
        );
        assert_eq!(
            format_line(&Value::Token('q'), OutputFormat::Json),
            "{\"value\":\"q\"}\n"
        );
    }

    #[tokio::test]
    async fn test_run_live_stops_on_runtime() {
        let mut generator = Generator::new(quick(0.0, 0.05)).unwrap();
        let (_tx, rx) = watch::channel(false);
        let mut out: Vec<u8> = Vec::new();
        let reason = run_live(&mut generator, OutputFormat::Plain, &mut out, rx)
            .await
            .unwrap();
        assert_eq!(reason, StopReason::RuntimeElapsed);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(!lines.is_empty());
        assert_eq!(lines.len() as u64, generator.counters().emitted);
        // First slot is the baseline at t = 0
        assert_eq!(lines[0], "0");
    }

    #[tokio::test]
    async fn test_run_live_stops_on_shutdown() {
        let mut generator =
            Generator::new(quick(0.5, 0.0).with_datatype(Datatype::Symbolic)).unwrap();
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let mut out: Vec<u8> = Vec::new();
        let reason = run_live(&mut generator, OutputFormat::Json, &mut out, rx)
            .await
            .unwrap();
        assert_eq!(reason, StopReason::Shutdown);
    }
}
