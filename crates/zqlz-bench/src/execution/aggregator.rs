//! Reduction of run measurements to per-statement summaries

use super::RunMeasurement;
use crate::{BenchError, Result, Statement};

/// Maximum number of statement characters kept in a summary label
pub const LABEL_MAX_CHARS: usize = 80;

const ELLIPSIS: &str = "...";

/// Timing statistics for one statement over its runs.
///
/// `min_ms <= avg_ms <= max_ms` and `run_count >= 1` always hold for
/// summaries produced by [`ResultAggregator`].
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySummary {
    /// Human-readable preview of the statement; not an identifier
    pub label: String,
    pub min_ms: f64,
    pub max_ms: f64,
    pub avg_ms: f64,
    pub run_count: usize,
}

/// Build the display label for a statement.
///
/// Whitespace runs collapse to one space, the text is cut to `max_chars`
/// characters and the ellipsis marker is appended.
pub fn statement_label(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut label: String = collapsed.chars().take(max_chars).collect();
    label.push_str(ELLIPSIS);
    label
}

/// Computes min/max/mean over a statement's measurements
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    label_max_chars: usize,
}

impl ResultAggregator {
    pub fn new(label_max_chars: usize) -> Self {
        Self {
            label_max_chars: label_max_chars.max(1),
        }
    }

    pub fn label_for(&self, statement: &Statement) -> String {
        statement_label(statement.text(), self.label_max_chars)
    }

    /// Summarize the measurements taken for `statement`.
    ///
    /// Fails with [`BenchError::EmptyMeasurements`] when there is nothing to
    /// summarize.
    pub fn summarize(
        &self,
        statement: &Statement,
        measurements: &[RunMeasurement],
    ) -> Result<QuerySummary> {
        let Some(first) = measurements.first() else {
            return Err(BenchError::EmptyMeasurements);
        };

        let (min_ms, max_ms, total_ms) = measurements.iter().fold(
            (first.duration_ms, first.duration_ms, 0.0),
            |(min, max, total), m| (min.min(m.duration_ms), max.max(m.duration_ms), total + m.duration_ms),
        );
        let run_count = measurements.len();

        // Rounding in the sum can push the mean just past an endpoint.
        let avg_ms = (total_ms / run_count as f64).clamp(min_ms, max_ms);

        Ok(QuerySummary {
            label: self.label_for(statement),
            min_ms,
            max_ms,
            avg_ms,
            run_count,
        })
    }
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new(LABEL_MAX_CHARS)
    }
}
