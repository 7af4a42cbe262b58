//! Test scaffolding shared by the zqlz-bench unit tests
//!
//! `RecordingConnection` is an instrumented `Connection` that records every
//! call in order and can be told to fail or to take a fixed amount of time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use zqlz_core::{
    ColumnMeta, Connection, QueryResult, Result, Row, StatementResult, Value, ZqlzError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Query,
    Execute,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub kind: CallKind,
    pub sql: String,
}

struct FailureRule {
    sql_fragment: String,
    /// Fail only on this 0-based call of a matching statement; `None` fails every call
    on_call: Option<usize>,
}

/// Instrumented connection for orchestrator and executor tests
pub struct RecordingConnection {
    calls: Mutex<Vec<Call>>,
    failures: Vec<FailureRule>,
    latency: Duration,
    rows: usize,
    dialect: Option<&'static str>,
    closed: AtomicBool,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Vec::new(),
            latency: Duration::ZERO,
            rows: 3,
            dialect: None,
            closed: AtomicBool::new(false),
        }
    }

    /// Every statement containing `sql_fragment` fails
    pub fn failing_on(mut self, sql_fragment: &str) -> Self {
        self.failures.push(FailureRule {
            sql_fragment: sql_fragment.to_string(),
            on_call: None,
        });
        self
    }

    /// The `call`-th (0-based) execution of a statement containing `sql_fragment` fails
    pub fn failing_on_call(mut self, sql_fragment: &str, call: usize) -> Self {
        self.failures.push(FailureRule {
            sql_fragment: sql_fragment.to_string(),
            on_call: Some(call),
        });
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_dialect(mut self, dialect: &'static str) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn calls_containing(&self, sql_fragment: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.sql.contains(sql_fragment))
            .count()
    }

    async fn record(&self, kind: CallKind, sql: &str) -> Result<()> {
        if self.is_closed() {
            return Err(ZqlzError::Closed);
        }

        let previous = self.calls_containing_each(sql);
        self.calls.lock().push(Call {
            kind,
            sql: sql.to_string(),
        });

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        for (rule, seen) in self.failures.iter().zip(previous) {
            if !sql.contains(&rule.sql_fragment) {
                continue;
            }
            if rule.on_call.is_none_or(|call| call == seen) {
                return Err(ZqlzError::Query(format!(
                    "simulated failure for '{}'",
                    rule.sql_fragment
                )));
            }
        }
        Ok(())
    }

    /// Prior matching-call count for each failure rule
    fn calls_containing_each(&self, sql: &str) -> Vec<usize> {
        let calls = self.calls.lock();
        self.failures
            .iter()
            .map(|rule| {
                if sql.contains(&rule.sql_fragment) {
                    calls
                        .iter()
                        .filter(|call| call.sql.contains(&rule.sql_fragment))
                        .count()
                } else {
                    0
                }
            })
            .collect()
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    fn driver_name(&self) -> &str {
        "recording"
    }

    fn dialect_id(&self) -> Option<&'static str> {
        self.dialect
    }

    async fn execute(&self, sql: &str) -> Result<StatementResult> {
        self.record(CallKind::Execute, sql).await?;
        Ok(StatementResult::new(1))
    }

    async fn query(&self, sql: &str) -> Result<QueryResult> {
        self.record(CallKind::Query, sql).await?;
        let rows = (0..self.rows)
            .map(|i| Row::new(vec![Value::Integer(i as i64)]))
            .collect();
        Ok(QueryResult::with_rows(
            vec![ColumnMeta {
                name: "n".into(),
                data_type: "INTEGER".into(),
            }],
            rows,
        ))
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
