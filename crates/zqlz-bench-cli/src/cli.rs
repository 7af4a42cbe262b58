//! zqlz-bench - phase benchmark runner
//!
//! Runs a SQL workload against a SQLite database for one optimization phase
//! and appends the timings to `results_<phase>.csv`. The `show` command
//! renders a phase's results as a table and a bar chart.

mod commands;
mod logging;
mod viewer;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use zqlz_bench::{BenchConfig, Phase};

/// Workload file read by `run` and `phases` when `--workload` is not given
pub const DEFAULT_WORKLOAD_FILE: &str = "zqlz-bench-workload.toml";

/// Phase-scoped SQL latency benchmarks
#[derive(Parser)]
#[command(name = "zqlz-bench", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./zqlz-bench.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the results_<phase>.csv files
    #[arg(long, global = true, env = "ZQLZ_BENCH_RESULTS_DIR")]
    pub results_dir: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a phase's workload and append its timings
    Run(RunArgs),

    /// Show the recorded results of a phase
    Show {
        /// Phase whose results to show
        #[arg(short, long)]
        phase: Phase,

        /// Width of the longest bar in the chart
        #[arg(long, default_value_t = viewer::DEFAULT_BAR_WIDTH)]
        width: usize,
    },

    /// List the phases defined by a workload file
    Phases {
        /// Workload file
        #[arg(short, long)]
        workload: Option<PathBuf>,
    },

    /// Delete or archive a phase's results
    Reset {
        /// Phase whose results to reset
        #[arg(short, long)]
        phase: Phase,

        /// Rename the file aside instead of deleting it
        #[arg(long)]
        archive: bool,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Phase to benchmark
    #[arg(short, long)]
    pub phase: Phase,

    /// SQLite database file to benchmark against
    #[arg(short, long)]
    pub database: PathBuf,

    /// Workload file
    #[arg(short, long)]
    pub workload: Option<PathBuf>,

    /// Executions per statement
    #[arg(short, long, env = "ZQLZ_BENCH_REPETITIONS")]
    pub repetitions: Option<u32>,

    /// SQL script executed before the benchmark (schema, seed data, indexes)
    #[arg(long)]
    pub setup: Option<PathBuf>,

    /// Delete the phase's previous results before running
    #[arg(long)]
    pub fresh: bool,
}

impl Cli {
    /// Load the config file and apply command-line overrides
    fn resolve_config(&self) -> Result<BenchConfig> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::load(path)?,
            None => BenchConfig::load_or_default(BenchConfig::DEFAULT_FILE)?,
        };

        if let Some(dir) = &self.results_dir {
            config.results_dir = dir.clone();
        }
        if let Command::Run(RunArgs {
            repetitions: Some(repetitions),
            ..
        }) = &self.command
        {
            config.repetitions = *repetitions;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let config = cli.resolve_config()?;
    tracing::debug!(?config, "configuration resolved");

    match cli.command {
        Command::Run(args) => commands::run(args, &config).await,
        Command::Show { phase, width } => commands::show(&phase, width, &config),
        Command::Phases { workload } => commands::phases(workload),
        Command::Reset { phase, archive } => commands::reset(&phase, archive, &config),
    }
}
