//! ooo-tandem CLI
//!
//! Runs the tandem-network simulation and prints the per-step dependency classification.
//!
//! # Example
//!
//! ```bash
//! # Reference scenario: 4 stations, 40 iterations, seed 0
//! ooo-tandem
//!
//! # Longer run on a wider line, printing only the execution order
//! ooo-tandem -n 8 -i 500 --seed 7 --format execution-order
//! ```

use clap::{Parser, ValueEnum};
use ooo_tandem::report::{TraceFormat, TraceWriter};
use ooo_tandem::{DelayRange, NetworkConfig, Simulation};
use std::io::{self, BufWriter};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// ooo-tandem
///
/// Simulates a tandem network of single-capacity stations and reports, after every executed event, which pending
/// events are directly dependent, indirectly dependent, or independent. Reproducible for a given seed.
#[derive(Parser, Debug)]
#[command(name = "ooo-tandem")]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of stations in the line
    #[arg(short = 'n', long, default_value = "4")]
    stations: usize,

    /// Maximum number of events to execute
    #[arg(short = 'i', long, default_value = "40")]
    iterations: usize,

    /// Random seed
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Stop once the next event lies beyond this simulated time
    #[arg(long)]
    max_time: Option<f64>,

    /// Minimum inter-arrival delay at station 1
    #[arg(long, default_value = "1")]
    ia_min: f64,

    /// Maximum inter-arrival delay at station 1
    #[arg(long, default_value = "2")]
    ia_max: f64,

    /// Minimum processing delay
    #[arg(long, default_value = "2")]
    proc_min: f64,

    /// Maximum processing delay
    #[arg(long, default_value = "10")]
    proc_max: f64,

    /// Minimum transit delay between stations
    #[arg(long, default_value = "0.1")]
    transit_min: f64,

    /// Maximum transit delay between stations
    #[arg(long, default_value = "0.2")]
    transit_max: f64,

    /// Output layout
    #[arg(short = 'f', long, value_enum, default_value_t = Format::Trace)]
    format: Format,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Per-step trace with every classification set
    Trace,
    /// Executed events in order, full precision
    ExecutionOrder,
    /// Per-step rows with timestamps truncated to two decimals
    Report,
}

impl From<Format> for TraceFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Trace => TraceFormat::Trace,
            Format::ExecutionOrder => TraceFormat::ExecutionOrder,
            Format::Report => TraceFormat::Report,
        }
    }
}

impl Args {
    fn to_config(&self) -> NetworkConfig {
        let mut config = NetworkConfig::new(self.stations)
            .with_inter_arrival(DelayRange::new(self.ia_min, self.ia_max))
            .with_processing(DelayRange::new(self.proc_min, self.proc_max))
            .with_transit(DelayRange::new(self.transit_min, self.transit_max))
            .with_seed(self.seed)
            .with_iterations(self.iterations);
        if let Some(max_time) = self.max_time {
            config = config.with_max_time(max_time);
        }
        config
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.to_config();
    let mut simulation = Simulation::new(&config)?;

    let stdout = io::stdout();
    let mut writer = TraceWriter::new(BufWriter::new(stdout.lock()), args.format.into())?;

    while let Some(record) = simulation.step()? {
        writer.write_step(&record)?;
    }
    let Some(summary) = simulation.summary() else {
        return Err("simulation stopped without halting".into());
    };
    writer.finish(&summary)?;

    info!(
        steps = summary.steps,
        reason = ?summary.halt_reason,
        final_time = %summary.final_time,
        indirect_total = summary.indirect_total,
        "Run complete"
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,ooo_tandem=info")),
        )
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
