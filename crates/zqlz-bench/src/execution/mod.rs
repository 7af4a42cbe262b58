//! Timed statement execution and aggregation
//!
//! `QueryExecutor` runs one statement a fixed number of times and records a
//! `RunMeasurement` per repetition; `ResultAggregator` reduces those
//! measurements to a `QuerySummary`.

mod aggregator;
mod classify;
mod executor;

pub use aggregator::{LABEL_MAX_CHARS, QuerySummary, ResultAggregator, statement_label};
pub use classify::StatementKind;
pub use executor::{QueryExecutor, RunMeasurement};
