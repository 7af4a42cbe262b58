//! Repeated, timed execution of a single statement

use std::time::{Duration, Instant};

use zqlz_core::Connection;

use super::StatementKind;
use crate::{BenchError, Phase, QueryExecutionError, Result, Statement};

/// Timing of one repetition of one statement
#[derive(Debug, Clone, PartialEq)]
pub struct RunMeasurement {
    pub phase: Phase,
    /// Position of the measured statement within its workload
    pub statement_position: usize,
    /// 0-based repetition index
    pub run_index: usize,
    pub duration_ms: f64,
}

impl RunMeasurement {
    pub fn new(phase: Phase, statement_position: usize, run_index: usize, duration_ms: f64) -> Self {
        Self {
            phase,
            statement_position,
            run_index,
            duration_ms,
        }
    }
}

/// Executes a statement a fixed number of times and times every repetition.
///
/// Repetitions run back to back on the caller's connection. Mutating
/// statements really mutate on every repetition, so an `UPDATE` run three
/// times applies its change three times.
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor;

impl QueryExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Run `statement` `repetitions` times and return one measurement per run.
    ///
    /// If any repetition fails the whole call fails with
    /// [`QueryExecutionError`] and measurements taken so far are discarded.
    #[tracing::instrument(skip_all, fields(phase = %phase, statement = statement.position()))]
    pub async fn execute(
        &self,
        conn: &dyn Connection,
        phase: &Phase,
        statement: &Statement,
        repetitions: u32,
    ) -> Result<Vec<RunMeasurement>> {
        if repetitions == 0 {
            return Err(BenchError::InvalidRepetitions(repetitions));
        }

        let kind = StatementKind::classify(statement.text(), conn.dialect_id());
        tracing::debug!(?kind, repetitions, "executing statement");

        let mut measurements = Vec::with_capacity(repetitions as usize);
        for run_index in 0..repetitions as usize {
            let elapsed = time_once(conn, statement.text(), kind)
                .await
                .map_err(|cause| QueryExecutionError {
                    failed_run_index: run_index,
                    cause,
                })?;

            let duration_ms = elapsed.as_secs_f64() * 1000.0;
            tracing::debug!(run_index, duration_ms, "run completed");
            measurements.push(RunMeasurement::new(
                phase.clone(),
                statement.position(),
                run_index,
                duration_ms,
            ));
        }

        Ok(measurements)
    }
}

async fn time_once(
    conn: &dyn Connection,
    sql: &str,
    kind: StatementKind,
) -> zqlz_core::Result<Duration> {
    match kind {
        StatementKind::RowReturning => {
            let start = Instant::now();
            // `query` only returns once the whole result set has been fetched.
            let result = conn.query(sql).await?;
            let elapsed = start.elapsed();
            tracing::trace!(rows = result.row_count(), "result set drained");
            Ok(elapsed)
        }
        StatementKind::Mutating => {
            let start = Instant::now();
            let result = conn.execute(sql).await?;
            let elapsed = start.elapsed();
            tracing::trace!(affected_rows = result.affected_rows, "statement acknowledged");
            Ok(elapsed)
        }
    }
}
