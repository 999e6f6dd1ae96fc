//! Piculator CLI - Monte Carlo estimation of pi
//!
//! Launches one sampling worker per hardware thread and runs until any line
//! (or end of input) arrives on stdin, then prints the estimate followed by
//! a CSV-safe deviation series:
//!
//! ```bash
//! piculator | grep ".*,.*" > output.csv   # press enter to stop
//! ```
//!
//! `--duration` and `--samples` replace the keypress with a timer or a
//! per-worker sample budget. Logs go to stderr; filter them with `RUST_LOG`.

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use piculator_engine::analysis::DeviationRecord;
use piculator_engine::config::EngineConfig;
use piculator_engine::engine::Engine;
use piculator_engine::report::{ReportSink, TextReport};
use piculator_engine::signal::{spawn_stdin_listener, spawn_timer, StopSignal};
use piculator_engine::slot::SlotSnapshot;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Monte Carlo pi estimator
#[derive(Parser)]
#[command(name = "piculator")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging for the engine
    #[arg(short, long)]
    verbose: bool,

    /// Number of worker threads (default: hardware parallelism)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Lead-worker samples between deviation checkpoints
    #[arg(short = 'i', long)]
    checkpoint_interval: Option<u64>,

    /// Stop every worker after this many samples instead of waiting for input
    #[arg(short, long)]
    samples: Option<u64>,

    /// Stop after this many seconds instead of waiting for input
    #[arg(short, long)]
    duration: Option<f64>,

    /// Base seed for reproducible sampling (default: OS entropy)
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut builder = EngineConfig::builder();
        if let Some(workers) = self.workers {
            builder = builder.workers(workers);
        }
        if let Some(interval) = self.checkpoint_interval {
            builder = builder.checkpoint_interval(interval);
        }
        if let Some(samples) = self.samples {
            builder = builder.sample_limit(samples);
        }
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        builder.build().context("invalid engine configuration")
    }

    fn interactive(&self) -> bool {
        self.samples.is_none() && self.duration.is_none()
    }
}

/// Adds the keypress prompt right after the launch line.
struct Prompted<R> {
    inner: R,
}

impl<R: ReportSink> ReportSink for Prompted<R> {
    fn launched(&mut self, workers: usize) -> io::Result<()> {
        self.inner.launched(workers)?;
        println!("Press any key to terminate computation.");
        Ok(())
    }

    fn interrupting(&mut self, index: usize) -> io::Result<()> {
        self.inner.interrupting(index)
    }

    fn summary(&mut self, totals: &SlotSnapshot) -> io::Result<()> {
        self.inner.summary(totals)
    }

    fn deviation_header(&mut self) -> io::Result<()> {
        self.inner.deviation_header()
    }

    fn deviation(&mut self, record: &DeviationRecord) -> io::Result<()> {
        self.inner.deviation(record)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose {
        "piculator_engine=debug"
    } else {
        "piculator_engine=info"
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    let config = cli.engine_config()?;
    info!(
        workers = config.workers(),
        checkpoint_interval = config.checkpoint_interval(),
        sample_limit = ?config.sample_limit(),
        "Configuration loaded"
    );

    let signal = StopSignal::new();
    if let Some(seconds) = cli.duration {
        let duration = Duration::try_from_secs_f64(seconds)
            .with_context(|| format!("invalid duration {seconds}"))?;
        spawn_timer(duration, signal.handle()).context("failed to start timer")?;
    }

    let mut engine = Engine::new(config);
    let summary = if cli.interactive() {
        spawn_stdin_listener(signal.handle()).context("failed to watch stdin")?;
        engine.run_uniform(
            &signal,
            Prompted {
                inner: TextReport::stdout(),
            },
        )?
    } else {
        engine.run_uniform(&signal, TextReport::stdout())?
    };

    info!(
        points = summary.totals.points_total,
        checkpoints = summary.checkpoints,
        "Piculator finished"
    );
    Ok(())
}
