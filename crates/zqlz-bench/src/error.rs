//! Error types for benchmark runs

use std::path::PathBuf;

use thiserror::Error;
use zqlz_core::ZqlzError;

use crate::Phase;

/// A statement failed on one of its repetitions.
///
/// No measurements survive for a statement that fails this way; the run
/// index says which repetition the database rejected.
#[derive(Error, Debug)]
#[error("statement failed on run {failed_run_index}: {cause}")]
pub struct QueryExecutionError {
    /// 0-based repetition that raised the error
    pub failed_run_index: usize,
    #[source]
    pub cause: ZqlzError,
}

/// A persisted result row that could not be read as a summary.
///
/// Collected during `ResultStore::load` rather than raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row}: {cause}")]
pub struct ResultsParseError {
    /// 1-based line number in the result file
    pub row: usize,
    pub cause: String,
}

/// Core error type for benchmark operations
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Unknown phase '{0}'")]
    UnknownPhase(Phase),

    #[error("Invalid phase name '{name}': {reason}")]
    InvalidPhaseName { name: String, reason: &'static str },

    #[error(transparent)]
    QueryExecution(#[from] QueryExecutionError),

    #[error("Cannot summarize a statement with no measurements")]
    EmptyMeasurements,

    #[error("No results for phase {phase} ({})", path.display())]
    ResultsNotFound { phase: Phase, path: PathBuf },

    #[error("Repetitions must be at least 1, got {0}")]
    InvalidRepetitions(u32),

    #[error("Workload error: {0}")]
    Workload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;
