//! ZQLZ Bench - phase-scoped SQL latency benchmarking
//!
//! Runs a fixed workload of SQL statements against a live connection, once
//! per optimization phase (baseline, indexes, columnstore, ...), and keeps
//! min/max/mean timings per statement in one CSV file per phase:
//!
//! - `WorkloadRegistry` - Which statements belong to which phase
//! - `QueryExecutor` - Timed, repeated execution of one statement
//! - `ResultAggregator` - Reduces run timings to a `QuerySummary`
//! - `ResultStore` - Append-only `results_<phase>.csv` files
//! - `PhaseBenchmarkOrchestrator` - Ties the above together for one phase run
//!
//! Everything runs sequentially on a single connection. Statements are never
//! reordered or executed concurrently, because row-returning statements are
//! placed ahead of mutating ones and must observe pre-mutation state.

mod config;
mod error;
pub mod execution;
pub mod orchestrator;
mod phase;
pub mod results;
pub mod workload;

#[cfg(test)]
mod test_helpers;

pub use config::BenchConfig;
pub use error::{BenchError, QueryExecutionError, Result, ResultsParseError};
pub use execution::{
    LABEL_MAX_CHARS, QueryExecutor, QuerySummary, ResultAggregator, RunMeasurement, StatementKind,
    statement_label,
};
pub use orchestrator::{
    DEFAULT_REPETITIONS, PhaseBenchmarkOrchestrator, PhaseRunReport, StatementFailure,
};
pub use phase::Phase;
pub use results::{
    PhaseResults, RESULTS_HEADER, RawResultRow, ResultBatch, ResultRecord, ResultStore,
};
pub use workload::{ResolvedWorkload, Statement, WorkloadRegistry, WorkloadSource};
