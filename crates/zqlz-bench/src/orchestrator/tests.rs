//! Tests for phase orchestration

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use zqlz_core::Connection;

use super::*;
use crate::test_helpers::{CallKind, RecordingConnection};
use crate::{ResultAggregator, ResultStore, WorkloadSource};

const BASELINE: [&str; 6] = [
    "SELECT id, display_name FROM users ORDER BY reputation DESC LIMIT 50",
    "SELECT post_type_id, COUNT(*) FROM posts GROUP BY post_type_id",
    "SELECT p.id, COUNT(c.id) FROM posts p LEFT JOIN comments c ON c.post_id = p.id GROUP BY p.id",
    "INSERT INTO comments (post_id, text) VALUES (1, 'benchmark')",
    "UPDATE posts SET score = score + 1 WHERE id < 1000",
    "DELETE FROM comments WHERE text = 'benchmark'",
];

fn registry() -> WorkloadRegistry {
    WorkloadRegistry::builder()
        .phase(Phase::Baseline, BASELINE)
        .phase(Phase::Indexes, Vec::<String>::new())
        .phase(
            Phase::Partition,
            ["SELECT year, COUNT(*) FROM posts_partitioned GROUP BY year"],
        )
        .build()
        .unwrap()
}

fn orchestrator() -> (TempDir, PhaseBenchmarkOrchestrator) {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = PhaseBenchmarkOrchestrator::new(registry(), ResultStore::new(dir.path()));
    (dir, orchestrator)
}

#[tokio::test]
async fn test_run_persists_one_summary_per_statement() {
    let (_dir, orchestrator) = orchestrator();
    let conn = Arc::new(RecordingConnection::new());

    let report = orchestrator
        .run(&Phase::Baseline, conn.clone(), DEFAULT_REPETITIONS)
        .await
        .unwrap();

    assert!(report.all_succeeded());
    assert_eq!(report.source, WorkloadSource::Own);
    assert_eq!(report.batch.len(), BASELINE.len());
    assert!(report.batch.iter().all(|s| s.run_count == 3));
    assert_eq!(conn.calls().len(), BASELINE.len() * 3);

    let loaded = orchestrator.store().load(&Phase::Baseline).unwrap();
    assert_eq!(loaded.len(), BASELINE.len());
    assert_eq!(report.results_path, orchestrator.store().path_for(&Phase::Baseline));
}

#[tokio::test]
async fn test_statements_execute_in_workload_order() {
    let (_dir, orchestrator) = orchestrator();
    let conn = Arc::new(RecordingConnection::new());

    orchestrator
        .run(&Phase::Baseline, conn.clone(), 2)
        .await
        .unwrap();

    let executed: Vec<String> = conn.calls().into_iter().map(|call| call.sql).collect();
    let expected: Vec<String> = BASELINE
        .iter()
        .flat_map(|sql| [sql.to_string(), sql.to_string()])
        .collect();
    assert_eq!(executed, expected);
}

#[tokio::test]
async fn test_reads_run_before_any_write() {
    let (_dir, orchestrator) = orchestrator();
    let conn = Arc::new(RecordingConnection::new());

    orchestrator
        .run(&Phase::Baseline, conn.clone(), 3)
        .await
        .unwrap();

    let kinds: Vec<CallKind> = conn.calls().iter().map(|call| call.kind).collect();
    let first_write = kinds
        .iter()
        .position(|kind| *kind == CallKind::Execute)
        .unwrap();
    assert!(kinds[..first_write].iter().all(|k| *k == CallKind::Query));
    assert!(kinds[first_write..].iter().all(|k| *k == CallKind::Execute));
    assert_eq!(first_write, 3 * 3);
}

#[tokio::test]
async fn test_failing_statement_is_reported_and_skipped() {
    let (_dir, orchestrator) = orchestrator();
    // Statement #2 (position 1) fails on every run.
    let conn = Arc::new(RecordingConnection::new().failing_on("GROUP BY post_type_id"));

    let report = orchestrator
        .run(&Phase::Baseline, conn.clone(), 3)
        .await
        .unwrap();

    assert_eq!(report.batch.len(), BASELINE.len() - 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.statement_count(), BASELINE.len());

    let failure = &report.failures[0];
    assert_eq!(failure.position, 1);
    assert_eq!(failure.error.failed_run_index, 0);
    assert!(failure.label.starts_with("SELECT post_type_id"));

    let persisted: Vec<String> = orchestrator
        .store()
        .load(&Phase::Baseline)
        .unwrap()
        .summaries()
        .map(|s| s.label.clone())
        .collect();
    let expected: Vec<String> = BASELINE
        .iter()
        .enumerate()
        .filter(|(position, _)| *position != 1)
        .map(|(_, sql)| ResultAggregator::default().label_for(&crate::Statement::new(0, *sql)))
        .collect();
    assert_eq!(persisted, expected);

    // Statements after the failure still ran.
    assert_eq!(conn.calls_containing("DELETE FROM comments"), 3);
}

#[tokio::test]
async fn test_failure_on_later_run_discards_statement() {
    let (_dir, orchestrator) = orchestrator();
    let conn = Arc::new(RecordingConnection::new().failing_on_call("UPDATE posts", 2));

    let report = orchestrator
        .run(&Phase::Baseline, conn.clone(), 3)
        .await
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].position, 4);
    assert_eq!(report.failures[0].error.failed_run_index, 2);
    assert_eq!(report.batch.len(), BASELINE.len() - 1);
}

#[tokio::test]
async fn test_empty_phase_borrows_baseline_workload() {
    let (_dir, orchestrator) = orchestrator();
    let conn = Arc::new(RecordingConnection::new());

    let report = orchestrator
        .run(&Phase::Indexes, conn.clone(), 1)
        .await
        .unwrap();

    assert_eq!(report.source, WorkloadSource::BaselineFallback);
    assert_eq!(report.batch.len(), BASELINE.len());
    assert!(orchestrator.store().exists(&Phase::Indexes));
    assert!(!orchestrator.store().exists(&Phase::Baseline));
}

#[tokio::test]
async fn test_phase_with_own_workload() {
    let (_dir, orchestrator) = orchestrator();
    let conn = Arc::new(RecordingConnection::new());

    let report = orchestrator
        .run(&Phase::Partition, conn.clone(), 3)
        .await
        .unwrap();

    assert_eq!(report.source, WorkloadSource::Own);
    assert_eq!(report.batch.len(), 1);
}

#[tokio::test]
async fn test_repeated_runs_append() {
    let (_dir, orchestrator) = orchestrator();

    for _ in 0..3 {
        let conn = Arc::new(RecordingConnection::new());
        orchestrator.run(&Phase::Baseline, conn, 1).await.unwrap();
    }

    let loaded = orchestrator.store().load(&Phase::Baseline).unwrap();
    assert_eq!(loaded.len(), 3 * BASELINE.len());
}

#[tokio::test]
async fn test_connection_closed_after_success() {
    let (_dir, orchestrator) = orchestrator();
    let conn = Arc::new(RecordingConnection::new());

    orchestrator
        .run(&Phase::Baseline, conn.clone(), 1)
        .await
        .unwrap();

    assert!(conn.is_closed());
}

#[tokio::test]
async fn test_unknown_phase_fails_and_closes_connection() {
    let (_dir, orchestrator) = orchestrator();
    let conn = Arc::new(RecordingConnection::new());

    let err = orchestrator
        .run(&Phase::Compression, conn.clone(), 3)
        .await
        .unwrap_err();

    assert!(matches!(err, BenchError::UnknownPhase(Phase::Compression)));
    assert!(conn.is_closed());
    assert!(conn.calls().is_empty());
    assert!(!orchestrator.store().exists(&Phase::Compression));
}

#[tokio::test]
async fn test_zero_repetitions_rejected() {
    let (_dir, orchestrator) = orchestrator();
    let conn = Arc::new(RecordingConnection::new());

    let err = orchestrator
        .run(&Phase::Baseline, conn.clone(), 0)
        .await
        .unwrap_err();

    assert!(matches!(err, BenchError::InvalidRepetitions(0)));
    assert!(conn.is_closed());
}

#[tokio::test]
async fn test_persist_failure_fails_and_closes_connection() {
    let dir = tempfile::tempdir().unwrap();
    let not_a_dir = dir.path().join("results");
    std::fs::write(&not_a_dir, "").unwrap();
    let orchestrator = PhaseBenchmarkOrchestrator::new(registry(), ResultStore::new(&not_a_dir));
    let conn = Arc::new(RecordingConnection::new());

    let err = orchestrator
        .run(&Phase::Baseline, conn.clone(), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, BenchError::Io(_)), "unexpected error: {err}");
    assert!(conn.is_closed());
    assert_eq!(conn.calls().len(), BASELINE.len());
}

#[tokio::test]
async fn test_custom_label_length() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = PhaseBenchmarkOrchestrator::new(registry(), ResultStore::new(dir.path()))
        .with_aggregator(ResultAggregator::new(6));
    let conn = Arc::new(RecordingConnection::new());

    let report = orchestrator
        .run(&Phase::Partition, conn, 1)
        .await
        .unwrap();

    assert_eq!(report.batch.as_slice()[0].label, "SELECT...");
}

mod sqlite {
    use pretty_assertions::assert_eq;

    use super::*;
    use zqlz_core::Value;
    use zqlz_driver_sqlite::SqliteConnection;

    const SCHEMA: &str = "
        CREATE TABLE posts (id INTEGER PRIMARY KEY, score INTEGER NOT NULL);
        CREATE TABLE comments (id INTEGER PRIMARY KEY, post_id INTEGER, text TEXT);
        INSERT INTO posts (id, score) VALUES (1, 0), (2, 0);
    ";

    fn workload() -> WorkloadRegistry {
        WorkloadRegistry::builder()
            .phase(
                Phase::Baseline,
                [
                    "SELECT COUNT(*) FROM comments",
                    "SELECT id, score FROM posts ORDER BY id",
                    "INSERT INTO comments (post_id, text) VALUES (1, 'benchmark')",
                    "UPDATE posts SET score = score + 1 WHERE id = 1",
                    "SELECT * FROM no_such_table",
                ],
            )
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_against_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("bench.db");

        let setup = SqliteConnection::open(&db_path).unwrap();
        setup.execute_batch(SCHEMA).unwrap();
        setup.close().await.unwrap();

        let orchestrator =
            PhaseBenchmarkOrchestrator::new(workload(), ResultStore::new(dir.path().join("out")));
        let conn: Arc<SqliteConnection> = Arc::new(SqliteConnection::open(&db_path).unwrap());

        let report = orchestrator
            .run(&Phase::Baseline, conn.clone(), 3)
            .await
            .unwrap();

        assert!(conn.is_closed());
        assert_eq!(report.batch.len(), 4);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].position, 4);

        let check = SqliteConnection::open(&db_path).unwrap();
        let score = check
            .query("SELECT score FROM posts WHERE id = 1")
            .await
            .unwrap();
        assert_eq!(score.rows[0].get(0), Some(&Value::Integer(3)));
        let comments = check
            .query("SELECT COUNT(*) FROM comments")
            .await
            .unwrap();
        assert_eq!(comments.rows[0].get(0), Some(&Value::Integer(3)));

        let loaded = orchestrator.store().load(&Phase::Baseline).unwrap();
        assert_eq!(loaded.len(), 4);
        assert!(loaded.errors.is_empty());
        for summary in loaded.summaries() {
            assert!(summary.min_ms <= summary.avg_ms && summary.avg_ms <= summary.max_ms);
            assert_eq!(summary.run_count, 3);
        }
    }
}

mod demo {
    use pretty_assertions::assert_eq;

    use super::*;
    use zqlz_driver_sqlite::SqliteConnection;

    const SCHEMA: &str = include_str!("../../../../demos/stackoverflow-schema.sql");
    const WORKLOAD: &str = include_str!("../../../../demos/stackoverflow-workload.toml");

    #[tokio::test]
    async fn test_demo_workload_runs_cleanly_on_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let conn = SqliteConnection::open(dir.path().join("so.db")).unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let orchestrator = PhaseBenchmarkOrchestrator::new(
            WorkloadRegistry::from_toml_str(WORKLOAD).unwrap(),
            ResultStore::new(dir.path()),
        );

        let report = orchestrator
            .run(&Phase::Baseline, Arc::new(conn), 1)
            .await
            .unwrap();

        assert!(
            report.all_succeeded(),
            "failures: {:?}",
            report.failures
        );
        assert_eq!(report.batch.len(), 9);
    }
}
