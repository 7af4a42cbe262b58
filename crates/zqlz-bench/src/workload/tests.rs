//! Tests for workload resolution

use indoc::indoc;

use super::*;
use crate::{BenchError, Phase};

fn sample_registry() -> WorkloadRegistry {
    WorkloadRegistry::builder()
        .phase(
            Phase::Baseline,
            [
                "SELECT id FROM users",
                "SELECT COUNT(*) FROM posts",
                "UPDATE posts SET score = score + 1",
            ],
        )
        .phase(Phase::Indexes, Vec::<String>::new())
        .phase(
            Phase::Partition,
            ["SELECT year, COUNT(*) FROM posts_partitioned GROUP BY year"],
        )
        .build()
        .unwrap()
}

mod resolve_tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_resolve_own_workload() {
        let registry = sample_registry();
        let resolved = registry.resolve(&Phase::Partition).unwrap();

        assert_eq!(resolved.source, WorkloadSource::Own);
        assert!(!resolved.is_fallback());
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved.statements[0].position(), 0);
    }

    #[test]
    fn test_resolve_preserves_order() {
        let registry = sample_registry();
        let resolved = registry.resolve(&Phase::Baseline).unwrap();

        let texts: Vec<&str> = resolved.statements.iter().map(|s| s.text()).collect();
        assert_eq!(
            texts,
            vec![
                "SELECT id FROM users",
                "SELECT COUNT(*) FROM posts",
                "UPDATE posts SET score = score + 1",
            ]
        );
        let positions: Vec<usize> = resolved.statements.iter().map(|s| s.position()).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_phase_falls_back_to_baseline() {
        let registry = sample_registry();
        let baseline = registry.resolve(&Phase::Baseline).unwrap();
        let indexes = registry.resolve(&Phase::Indexes).unwrap();

        assert_eq!(indexes.source, WorkloadSource::BaselineFallback);
        assert!(indexes.is_fallback());
        assert_eq!(indexes.phase, Phase::Indexes);
        assert_eq!(indexes.len(), baseline.len());
        assert_eq!(indexes.statements, baseline.statements);
    }

    #[test]
    fn test_unregistered_phase_is_unknown() {
        let registry = sample_registry();
        let err = registry.resolve(&Phase::Columnstore).unwrap_err();

        assert!(matches!(err, BenchError::UnknownPhase(Phase::Columnstore)));
    }

    #[test]
    fn test_fallback_without_baseline_is_unknown_baseline() {
        let registry = WorkloadRegistry::builder()
            .phase(Phase::Compression, Vec::<String>::new())
            .build()
            .unwrap();

        let err = registry.resolve(&Phase::Compression).unwrap_err();
        assert!(matches!(err, BenchError::UnknownPhase(Phase::Baseline)));
    }

    #[test]
    fn test_empty_baseline_resolves_to_nothing() {
        let registry = WorkloadRegistry::builder()
            .phase(Phase::Baseline, Vec::<String>::new())
            .build()
            .unwrap();

        let resolved = registry.resolve(&Phase::Baseline).unwrap();
        assert_eq!(resolved.source, WorkloadSource::Own);
        assert!(resolved.is_empty());
    }
}

mod builder_tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_statements_are_trimmed() {
        let registry = WorkloadRegistry::builder()
            .phase(Phase::Baseline, ["\n    SELECT 1;\n  "])
            .build()
            .unwrap();

        let resolved = registry.resolve(&Phase::Baseline).unwrap();
        assert_eq!(resolved.statements[0].text(), "SELECT 1;");
    }

    #[test]
    fn test_blank_statement_is_rejected() {
        let err = WorkloadRegistry::builder()
            .phase(Phase::Baseline, ["SELECT 1", "   "])
            .build()
            .unwrap_err();

        match err {
            BenchError::Workload(message) => assert!(message.contains("#2")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_phase_is_rejected() {
        let err = WorkloadRegistry::builder()
            .phase(Phase::Baseline, ["SELECT 1"])
            .phase(Phase::Baseline, ["SELECT 2"])
            .build()
            .unwrap_err();

        assert!(matches!(err, BenchError::Workload(_)));
    }

    #[test]
    fn test_phases_listed_in_registration_order() {
        let registry = sample_registry();
        let phases: Vec<&Phase> = registry.phases().collect();

        assert_eq!(
            phases,
            vec![&Phase::Baseline, &Phase::Indexes, &Phase::Partition]
        );
        assert!(registry.contains(&Phase::Indexes));
        assert!(!registry.contains(&Phase::Compression));
    }
}

mod toml_tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_from_toml_str() {
        let source = indoc! {r#"
            [phases]
            baseline = [
                "SELECT TOP (50) Id FROM dbo.Users",
                "DELETE FROM dbo.Comments WHERE Id < 1000",
            ]
            indexes = []
            Warm_Cache = ["SELECT 1"]
        "#};

        let registry = WorkloadRegistry::from_toml_str(source).unwrap();
        let phases: Vec<&Phase> = registry.phases().collect();
        assert_eq!(
            phases,
            vec![
                &Phase::Baseline,
                &Phase::Indexes,
                &Phase::Custom("warm_cache".into())
            ]
        );

        let indexes = registry.resolve(&Phase::Indexes).unwrap();
        assert!(indexes.is_fallback());
        assert_eq!(indexes.len(), 2);
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        let source = indoc! {r#"
            [phases]
            baseline = ["SELECT 1"]

            [extra]
            key = 1
        "#};

        assert!(matches!(
            WorkloadRegistry::from_toml_str(source),
            Err(BenchError::Workload(_))
        ));
    }

    #[test]
    fn test_from_toml_rejects_invalid_phase_name() {
        let source = indoc! {r#"
            [phases]
            "bad name" = ["SELECT 1"]
        "#};

        assert!(matches!(
            WorkloadRegistry::from_toml_str(source),
            Err(BenchError::InvalidPhaseName { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workload.toml");
        std::fs::write(&path, "[phases]\nbaseline = [\"SELECT 1\"]\n").unwrap();

        let registry = WorkloadRegistry::load(&path).unwrap();
        assert_eq!(registry.len(), 1);

        let missing = WorkloadRegistry::load(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(BenchError::Workload(_))));
    }
}

mod demo_workload_tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::StatementKind;

    const DEMO: &str = include_str!("../../../../demos/stackoverflow-workload.toml");

    #[test]
    fn test_demo_workload_parses() {
        let registry = WorkloadRegistry::from_toml_str(DEMO).unwrap();

        for phase in Phase::BUILT_IN {
            assert!(registry.contains(&phase), "{phase} missing");
        }
        assert!(registry.resolve(&Phase::Columnstore).unwrap().is_fallback());
        assert!(!registry.resolve(&Phase::Partition).unwrap().is_fallback());
    }

    #[test]
    fn test_demo_baseline_reads_before_writes() {
        let registry = WorkloadRegistry::from_toml_str(DEMO).unwrap();
        let baseline = registry.resolve(&Phase::Baseline).unwrap();

        let kinds: Vec<StatementKind> = baseline
            .statements
            .iter()
            .map(|s| StatementKind::classify(s.text(), Some("sqlite")))
            .collect();
        let first_write = kinds
            .iter()
            .position(|kind| *kind == StatementKind::Mutating)
            .unwrap();

        assert!(first_write > 0);
        assert!(kinds[..first_write].iter().all(|k| k.is_row_returning()));
        assert!(kinds[first_write..].iter().all(|k| !k.is_row_returning()));
    }
}
