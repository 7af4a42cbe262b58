//! Command handlers

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::{Table, presets::UTF8_FULL};
use zqlz_bench::{
    BenchConfig, BenchError, Phase, PhaseBenchmarkOrchestrator, PhaseRunReport,
    ResultAggregator, ResultStore, WorkloadRegistry, WorkloadSource,
};
use zqlz_driver_sqlite::SqliteConnection;

use crate::{DEFAULT_WORKLOAD_FILE, RunArgs, viewer};

fn load_workload(path: Option<PathBuf>) -> Result<WorkloadRegistry> {
    let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_WORKLOAD_FILE));
    WorkloadRegistry::load(&path)
        .with_context(|| format!("Failed to load workload from {}", path.display()))
}

pub async fn run(args: RunArgs, config: &BenchConfig) -> Result<()> {
    let registry = load_workload(args.workload)?;
    if !registry.contains(&args.phase) {
        anyhow::bail!(BenchError::UnknownPhase(args.phase));
    }

    let conn = SqliteConnection::open(&args.database)
        .with_context(|| format!("Failed to open database {}", args.database.display()))?;
    if let Some(setup) = &args.setup {
        run_setup(&conn, setup)?;
    }

    // Reset only once the database and setup are ready
    let store = ResultStore::new(&config.results_dir);
    if args.fresh && store.reset(&args.phase)? {
        println!("Removed previous results for phase {}", args.phase);
    }

    let orchestrator = PhaseBenchmarkOrchestrator::new(registry, store)
        .with_aggregator(ResultAggregator::new(config.label_max_chars));

    let report = orchestrator
        .run(&args.phase, Arc::new(conn), config.repetitions)
        .await
        .with_context(|| format!("Benchmark of phase {} failed", args.phase))?;

    print_report(&report, config.repetitions);
    Ok(())
}

fn run_setup(conn: &SqliteConnection, path: &Path) -> Result<()> {
    let script = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read setup script {}", path.display()))?;
    tracing::info!(path = %path.display(), "running setup script");
    conn.execute_batch(&script)
        .with_context(|| format!("Setup script {} failed", path.display()))?;
    Ok(())
}

fn print_report(report: &PhaseRunReport, repetitions: u32) {
    let source = match report.source {
        WorkloadSource::Own => "own workload",
        WorkloadSource::BaselineFallback => "baseline workload",
    };
    println!(
        "Phase {}: {} of {} statements measured ({}, {} runs each) in {:.2}s",
        report.phase,
        report.batch.len(),
        report.statement_count(),
        source,
        repetitions,
        report.elapsed.as_secs_f64(),
    );
    println!("Results appended to {}", report.results_path.display());

    if !report.all_succeeded() {
        println!();
        println!("{} statement(s) failed and were not recorded:", report.failures.len());
        for failure in &report.failures {
            println!("  #{} {}", failure.position + 1, failure.label);
            println!("     {}", failure.error);
        }
    }
}

pub fn show(phase: &Phase, width: usize, config: &BenchConfig) -> Result<()> {
    let store = ResultStore::new(&config.results_dir);
    match store.load(phase) {
        Ok(results) => {
            print!("{}", viewer::render(&results, width));
            Ok(())
        }
        Err(BenchError::ResultsNotFound { .. }) => {
            println!("No results for phase {} in {}", phase, store.dir().display());
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load results for phase {}", phase)),
    }
}

pub fn phases(workload: Option<PathBuf>) -> Result<()> {
    let registry = load_workload(workload)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Phase", "Workload", "Statements"]);

    for phase in registry.phases() {
        let (source, count) = match registry.resolve(phase) {
            Ok(resolved) if resolved.is_fallback() => ("baseline".to_string(), resolved.len()),
            Ok(resolved) => ("own".to_string(), resolved.len()),
            Err(e) => (e.to_string(), 0),
        };
        table.add_row(vec![phase.to_string(), source, count.to_string()]);
    }

    println!("{table}");
    Ok(())
}

pub fn reset(phase: &Phase, archive: bool, config: &BenchConfig) -> Result<()> {
    let store = ResultStore::new(&config.results_dir);

    if archive {
        match store.archive(phase) {
            Ok(path) => println!("Archived results for phase {} to {}", phase, path.display()),
            Err(BenchError::ResultsNotFound { .. }) => {
                println!("No results for phase {}", phase)
            }
            Err(e) => return Err(e.into()),
        }
    } else if store.reset(phase)? {
        println!("Removed results for phase {}", phase);
    } else {
        println!("No results for phase {}", phase);
    }

    Ok(())
}
