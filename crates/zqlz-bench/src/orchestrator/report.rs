use std::path::PathBuf;
use std::time::Duration;

use crate::{Phase, QueryExecutionError, ResultBatch, WorkloadSource};

/// A statement that failed during a phase run and was left out of the batch
#[derive(Debug)]
pub struct StatementFailure {
    /// Position of the statement within the phase's workload
    pub position: usize,
    pub label: String,
    pub error: QueryExecutionError,
}

/// Outcome of one `PhaseBenchmarkOrchestrator::run`
#[derive(Debug)]
pub struct PhaseRunReport {
    pub phase: Phase,
    /// Whether the statements were the phase's own or baseline's
    pub source: WorkloadSource,
    /// Summaries appended to the result file, in statement order
    pub batch: ResultBatch,
    pub failures: Vec<StatementFailure>,
    pub results_path: PathBuf,
    /// Wall time of the whole run, persistence included
    pub elapsed: Duration,
}

impl PhaseRunReport {
    /// Number of statements attempted
    pub fn statement_count(&self) -> usize {
        self.batch.len() + self.failures.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}
