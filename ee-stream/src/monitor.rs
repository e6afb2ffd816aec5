// Entropy Engine Stream - Tick loop
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Monitor tick loop.
//!
//! Pulls one sample per tick from a [`SampleSource`], runs it through the
//! [`EntropyEngine`] and writes one JSON [`TickRecord`] per line.
//!
//! [`TickRecord`]: entropy_engine::TickRecord

use crate::error::{Result, StreamError};
use crate::metrics;
use crate::transport::TransportStats;
use entropy_engine::{EntropyEngine, SampleSource};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::info;

/// Where monitor samples come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Resilient TCP client.
    #[default]
    Tcp,
    /// `value` column of a CSV file.
    Csv,
    /// In-process polled generator.
    Generator,
    /// Mean-reverting random walk.
    Random,
}

impl SourceKind {
    /// Whether this source depends on wall-clock pacing to make sense.
    pub fn needs_pacing(&self) -> bool {
        matches!(self, SourceKind::Tcp)
    }
}

/// Tick loop options.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonitorOptions {
    /// Stop after this many ticks.
    pub max_ticks: Option<u64>,
    /// Sleep `dt` between ticks. Off runs as fast as the source allows.
    pub paced: bool,
}

/// Interval ticking every `dt` seconds, at least one nanosecond apart.
fn tick_clock(dt: f64) -> Result<Interval> {
    let period = Duration::try_from_secs_f64(dt).map_err(|_| {
        StreamError::InvalidArgument(format!("dt of {}s is not a usable tick period", dt))
    })?;
    let mut clock = interval(period.max(Duration::from_nanos(1)));
    clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Ok(clock)
}

/// Run the tick loop until the source is exhausted, the tick limit is
/// reached or shutdown is signalled. Returns the number of ticks run.
pub async fn run_monitor<S, W>(
    engine: &mut EntropyEngine,
    source: &mut S,
    options: MonitorOptions,
    out: &mut W,
    transport: Option<&TransportStats>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<u64>
where
    S: SampleSource + ?Sized,
    W: AsyncWrite + Unpin,
{
    let mut clock = if options.paced {
        Some(tick_clock(engine.config().dt)?)
    } else {
        None
    };
    let mut ticks = 0u64;

    info!(
        "Monitor started: source={}, bins={}, window={}, dt={}, ema={}, edges={}",
        source.name(),
        engine.config().bins,
        engine.config().window,
        engine.config().dt,
        engine.config().ema,
        engine.config().edges.as_str()
    );

    loop {
        if matches!(options.max_ticks, Some(max) if ticks >= max) {
            break;
        }
        if let Some(clock) = clock.as_mut() {
            tokio::select! {
                _ = clock.tick() => {}
                _ = shutdown.changed() => break,
            }
        } else {
            if *shutdown.borrow() {
                break;
            }
            tokio::task::yield_now().await;
        }

        let Some(record) = engine.tick(source) else {
            info!("Source {} exhausted", source.name());
            break;
        };

        let mut line = record.to_json()?;
        line.push('\n');
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;

        metrics::update_tick(&record, engine.histogram().rebuilds());
        if let Some(stats) = transport {
            metrics::update_transport(&stats.snapshot());
        }
        ticks += 1;
    }

    info!("Monitor stopped after {} ticks", ticks);
    Ok(ticks)
}
