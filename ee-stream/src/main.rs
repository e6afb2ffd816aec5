// Entropy Engine Stream - Command line
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # ee-stream
//!
//! ## Usage
//!
//! ```bash
//! # Serve a mixed stream to one TCP client
//! ee-stream serve --addr 127.0.0.1:9009 --datatype mixed --uf 0.4
//!
//! # Print a numeric stream on stdout
//! ee-stream emit --uf 0.2 --runtime 10
//!
//! # Monitor a TCP stream, exposing Prometheus metrics on :9100
//! ee-stream monitor --source tcp --addr 127.0.0.1:9009 --metrics-port 9100
//! ```
//!
//! Data goes to stdout, logs and the generator summary to stderr.

use clap::{Args, Parser, Subcommand};
use ee_stream::csv_source::load_csv;
use ee_stream::metrics::serve_metrics;
use ee_stream::server::{emit_stdout, GeneratorServer, OutputFormat};
use ee_stream::{run_monitor, MonitorOptions, SourceKind, StreamError, TcpTransport, TransportConfig};
use ee_testdata::{Datatype, GeneratorCounters, GeneratorSource, RandomWalkSource, StreamConfig};
use entropy_engine::{EdgePolicy, EngineConfig, EntropyEngine, ReplayEnd, SampleSource};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Entropy engine stream tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve generator output to a single TCP client
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:9009")]
        addr: String,

        #[command(flatten)]
        generator: GeneratorArgs,
    },
    /// Print generator output on stdout
    Emit {
        #[command(flatten)]
        generator: GeneratorArgs,
    },
    /// Run the entropy engine over a source and print one record per tick
    Monitor(MonitorArgs),
}

#[derive(Args, Debug)]
struct GeneratorArgs {
    /// numeric | alphabetic | symbolic | mixed (also 123 | abc | sym | mix)
    #[arg(long, default_value = "numeric", value_parser = parse_datatype)]
    datatype: Datatype,

    /// Unexpected factor in [0, 1]
    #[arg(long = "uf", default_value = "0.3")]
    unexpected_factor: f64,

    /// Random seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Seconds between emissions
    #[arg(long = "clock", default_value = "0.05")]
    clock_period: f64,

    /// Seconds before stopping (0 = unbounded)
    #[arg(long = "runtime", default_value = "0")]
    total_runtime: f64,

    /// Line format
    #[arg(long, value_enum, default_value = "plain")]
    format: OutputFormat,
}

impl GeneratorArgs {
    fn stream_config(&self) -> StreamConfig {
        StreamConfig::new()
            .with_datatype(self.datatype)
            .with_unexpected_factor(self.unexpected_factor)
            .with_seed(self.seed)
            .with_clock_period(self.clock_period)
            .with_total_runtime(self.total_runtime)
    }
}

#[derive(Args, Debug)]
struct MonitorArgs {
    /// Sample source
    #[arg(long, value_enum, default_value = "tcp")]
    source: SourceKind,

    /// Address of the line stream (tcp source)
    #[arg(long, default_value = "127.0.0.1:9009")]
    addr: String,

    /// CSV file with a `value` column (csv source)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Loop the CSV when it reaches the end instead of holding the last value
    #[arg(long)]
    loop_replay: bool,

    /// Engine configuration JSON; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    bins: Option<usize>,

    #[arg(long)]
    window: Option<usize>,

    /// Seconds per tick
    #[arg(long)]
    dt: Option<f64>,

    /// EMA weight in (0, 1]
    #[arg(long)]
    ema: Option<f64>,

    /// Time scale applied to slope and curvature
    #[arg(long)]
    tstar: Option<f64>,

    /// fixed | adaptive
    #[arg(long, value_parser = parse_edges)]
    edges: Option<EdgePolicy>,

    /// Generator settings (generator source)
    #[arg(long, default_value = "mixed", value_parser = parse_datatype)]
    datatype: Datatype,

    #[arg(long = "uf", default_value = "0.3")]
    unexpected_factor: f64,

    #[arg(long, default_value = "42")]
    seed: u64,

    /// Stop after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Do not sleep between ticks (ignored for the tcp source)
    #[arg(long)]
    fast: bool,

    /// Expose Prometheus metrics on this port
    #[arg(long)]
    metrics_port: Option<u16>,
}

impl MonitorArgs {
    fn engine_config(&self) -> Result<EngineConfig, StreamError> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => EngineConfig::default(),
        };
        if let Some(bins) = self.bins {
            config.bins = bins;
        }
        if let Some(window) = self.window {
            config.window = window;
        }
        if let Some(dt) = self.dt {
            config.dt = dt;
        }
        if let Some(ema) = self.ema {
            config.ema = ema;
        }
        if self.tstar.is_some() {
            config.tstar = self.tstar;
        }
        if let Some(edges) = self.edges {
            config.edges = edges;
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_datatype(s: &str) -> Result<Datatype, String> {
    s.parse().map_err(|e: ee_testdata::ConfigError| e.to_string())
}

fn parse_edges(s: &str) -> Result<EdgePolicy, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match cli.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("ee-stream v{}", env!("CARGO_PKG_VERSION"));

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Shutdown channel flipped by Ctrl-C.
fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted");
            let _ = tx.send(true);
        }
        // Receivers treat a dropped sender as shutdown
        std::future::pending::<()>().await;
    });
    rx
}

fn print_summary(counters: &GeneratorCounters) -> Result<(), StreamError> {
    eprintln!("{}", counters.to_json()?);
    Ok(())
}

async fn run(command: Command) -> Result<(), StreamError> {
    let shutdown = shutdown_on_ctrl_c();

    match command {
        Command::Serve { addr, generator } => {
            let server =
                GeneratorServer::bind(&addr, generator.stream_config(), generator.format).await?;
            let counters = server.serve(shutdown).await?;
            print_summary(&counters)
        }
        Command::Emit { generator } => {
            let counters =
                emit_stdout(generator.stream_config(), generator.format, shutdown).await?;
            print_summary(&counters)
        }
        Command::Monitor(args) => monitor(args, shutdown).await,
    }
}

async fn monitor(args: MonitorArgs, shutdown: watch::Receiver<bool>) -> Result<(), StreamError> {
    let config = args.engine_config()?;
    let mut engine = EntropyEngine::new(config.clone())?;

    if let Some(port) = args.metrics_port {
        serve_metrics(SocketAddr::from(([0, 0, 0, 0], port))).await?;
    }

    let options = MonitorOptions {
        max_ticks: args.max_ticks,
        paced: !args.fast || args.source.needs_pacing(),
    };
    let mut stdout = tokio::io::stdout();

    let mut source: Box<dyn SampleSource> = match args.source {
        SourceKind::Tcp => {
            let mut transport = TcpTransport::spawn(
                TransportConfig::new(args.addr.clone())
                    .with_reconnect_backoff(Duration::from_millis(500)),
            );
            let stats = transport.stats();
            let result = run_monitor(
                &mut engine,
                &mut transport,
                options,
                &mut stdout,
                Some(stats.as_ref()),
                shutdown,
            )
            .await;
            transport.stop().await;
            result?;
            return Ok(());
        }
        SourceKind::Csv => {
            let path = args.csv.as_ref().ok_or_else(|| {
                StreamError::InvalidArgument("--csv is required for the csv source".into())
            })?;
            let end = if args.loop_replay {
                ReplayEnd::Loop
            } else {
                ReplayEnd::Hold
            };
            Box::new(load_csv(path, end)?)
        }
        SourceKind::Generator => {
            let stream = StreamConfig::new()
                .with_datatype(args.datatype)
                .with_unexpected_factor(args.unexpected_factor)
                .with_seed(args.seed)
                .with_module_dt(config.dt);
            Box::new(GeneratorSource::new(stream)?)
        }
        SourceKind::Random => Box::new(RandomWalkSource::new(args.seed, 0.0, 0.1)),
    };
    run_monitor(&mut engine, &mut source, options, &mut stdout, None, shutdown).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor_args(extra: &[&str]) -> MonitorArgs {
        let argv = ["ee-stream", "monitor"].iter().chain(extra).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Monitor(args) => args,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_monitor_random_source() {
        let args = monitor_args(&["--source", "random", "--fast", "--max-ticks", "5"]);
        let (_tx, rx) = watch::channel(false);
        assert!(monitor(args, rx).await.is_ok());
    }

    #[tokio::test]
    async fn test_monitor_generator_source() {
        let args = monitor_args(&["--source", "generator", "--fast", "--max-ticks", "5"]);
        let (_tx, rx) = watch::channel(false);
        assert!(monitor(args, rx).await.is_ok());
    }

    #[tokio::test]
    async fn test_monitor_csv_requires_path() {
        let args = monitor_args(&["--source", "csv", "--fast"]);
        let (_tx, rx) = watch::channel(false);
        assert!(matches!(
            monitor(args, rx).await,
            Err(StreamError::InvalidArgument(_))
        ));
    }
}
