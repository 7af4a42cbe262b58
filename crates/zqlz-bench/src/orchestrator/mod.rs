//! Phase benchmark orchestration
//!
//! One `run` resolves a phase's workload, executes and summarizes each
//! statement in workload order, and appends the summaries to the phase's
//! result file. A statement whose execution fails is reported and skipped;
//! the run carries on with the next statement.

mod report;
#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Instant;

use zqlz_core::Connection;

use crate::{
    BenchError, Phase, QueryExecutor, ResultAggregator, ResultBatch, ResultStore, Result,
    WorkloadRegistry,
};

pub use report::{PhaseRunReport, StatementFailure};

/// Repetitions per statement when none are configured
pub const DEFAULT_REPETITIONS: u32 = 3;

/// Runs a phase's workload and persists the timings.
///
/// Statements run strictly in workload order on a single connection and are
/// never reordered or executed concurrently.
#[derive(Debug, Clone)]
pub struct PhaseBenchmarkOrchestrator {
    registry: WorkloadRegistry,
    executor: QueryExecutor,
    aggregator: ResultAggregator,
    store: ResultStore,
}

impl PhaseBenchmarkOrchestrator {
    pub fn new(registry: WorkloadRegistry, store: ResultStore) -> Self {
        Self {
            registry,
            executor: QueryExecutor::new(),
            aggregator: ResultAggregator::default(),
            store,
        }
    }

    /// Use `aggregator` instead of the default one
    pub fn with_aggregator(mut self, aggregator: ResultAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Benchmark `phase` on `conn`, running each statement `repetitions` times.
    ///
    /// The connection is closed before returning, whether the run succeeded
    /// or not. Per-statement execution failures end up in
    /// [`PhaseRunReport::failures`]; any other error aborts the run.
    #[tracing::instrument(skip_all, fields(phase = %phase, repetitions = repetitions))]
    pub async fn run(
        &self,
        phase: &Phase,
        conn: Arc<dyn Connection>,
        repetitions: u32,
    ) -> Result<PhaseRunReport> {
        let outcome = self.run_on(phase, conn.as_ref(), repetitions).await;

        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "failed to close connection");
        }

        outcome
    }

    async fn run_on(
        &self,
        phase: &Phase,
        conn: &dyn Connection,
        repetitions: u32,
    ) -> Result<PhaseRunReport> {
        if repetitions == 0 {
            return Err(BenchError::InvalidRepetitions(repetitions));
        }

        let started = Instant::now();
        let workload = self.registry.resolve(phase)?;
        tracing::info!(
            statements = workload.len(),
            source = ?workload.source,
            driver = conn.driver_name(),
            "phase run started"
        );

        let mut batch = ResultBatch::new();
        let mut failures = Vec::new();

        for statement in workload.statements {
            match self
                .executor
                .execute(conn, phase, statement, repetitions)
                .await
            {
                Ok(measurements) => {
                    batch.push(self.aggregator.summarize(statement, &measurements)?);
                }
                Err(BenchError::QueryExecution(error)) => {
                    let label = self.aggregator.label_for(statement);
                    tracing::warn!(
                        statement_index = statement.position(),
                        run_index = error.failed_run_index,
                        error = %error.cause,
                        "statement failed, continuing with the next one"
                    );
                    failures.push(StatementFailure {
                        position: statement.position(),
                        label,
                        error,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        let results_path = self.store.persist(phase, &batch)?;
        let elapsed = started.elapsed();

        tracing::info!(
            succeeded = batch.len(),
            failed = failures.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "phase run finished"
        );

        Ok(PhaseRunReport {
            phase: phase.clone(),
            source: workload.source,
            batch,
            failures,
            results_path,
            elapsed,
        })
    }
}
