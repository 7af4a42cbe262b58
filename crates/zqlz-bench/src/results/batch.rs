use std::path::PathBuf;

use crate::{Phase, QuerySummary, ResultsParseError};

/// Summaries produced by one phase run, in statement order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultBatch {
    summaries: Vec<QuerySummary>,
}

impl ResultBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, summary: QuerySummary) {
        self.summaries.push(summary);
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuerySummary> {
        self.summaries.iter()
    }

    pub fn as_slice(&self) -> &[QuerySummary] {
        &self.summaries
    }
}

impl From<Vec<QuerySummary>> for ResultBatch {
    fn from(summaries: Vec<QuerySummary>) -> Self {
        Self { summaries }
    }
}

impl<'a> IntoIterator for &'a ResultBatch {
    type Item = &'a QuerySummary;
    type IntoIter = std::slice::Iter<'a, QuerySummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.summaries.iter()
    }
}

/// Text of a result row that did not parse as a summary.
///
/// Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResultRow {
    pub query: String,
    pub min_time_ms: String,
    pub max_time_ms: String,
    pub avg_time_ms: String,
    pub runs: String,
}

/// One data row of a result file
#[derive(Debug, Clone, PartialEq)]
pub enum ResultRecord {
    Summary(QuerySummary),
    Degraded(RawResultRow),
}

impl ResultRecord {
    pub fn as_summary(&self) -> Option<&QuerySummary> {
        match self {
            ResultRecord::Summary(summary) => Some(summary),
            ResultRecord::Degraded(_) => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ResultRecord::Degraded(_))
    }

    /// Label of the row, raw text for degraded rows
    pub fn label(&self) -> &str {
        match self {
            ResultRecord::Summary(summary) => &summary.label,
            ResultRecord::Degraded(raw) => &raw.query,
        }
    }
}

/// Everything read back from a phase's result file.
///
/// Rows keep file order. `errors` holds one entry per degraded record.
#[derive(Debug, Clone)]
pub struct PhaseResults {
    pub phase: Phase,
    pub path: PathBuf,
    pub records: Vec<ResultRecord>,
    pub errors: Vec<ResultsParseError>,
}

impl PhaseResults {
    pub fn summaries(&self) -> impl Iterator<Item = &QuerySummary> {
        self.records.iter().filter_map(ResultRecord::as_summary)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
