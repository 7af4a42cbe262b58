//! Benchmark configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{BenchError, LABEL_MAX_CHARS, Result};

/// Settings shared by every benchmark run.
///
/// Read from an optional `zqlz-bench.toml`; every field falls back to its
/// default when absent. Command-line flags override what is loaded here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Directory holding the `results_<phase>.csv` files
    pub results_dir: PathBuf,
    /// Times each statement is executed per phase run
    pub repetitions: u32,
    /// Characters of statement text kept in result labels
    pub label_max_chars: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("."),
            repetitions: 3,
            label_max_chars: LABEL_MAX_CHARS,
        }
    }
}

impl BenchConfig {
    /// Config file looked up in the working directory when none is given
    pub const DEFAULT_FILE: &'static str = "zqlz-bench.toml";

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| BenchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            BenchError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&source)
    }

    /// Load the config at `path`, or defaults if the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.repetitions == 0 {
            return Err(BenchError::InvalidRepetitions(self.repetitions));
        }
        if self.label_max_chars == 0 {
            return Err(BenchError::Config(
                "label_max_chars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_uses_defaults() {
        assert_eq!(BenchConfig::from_toml_str("").unwrap(), BenchConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = BenchConfig::from_toml_str("repetitions = 5").unwrap();

        assert_eq!(config.repetitions, 5);
        assert_eq!(config.results_dir, PathBuf::from("."));
        assert_eq!(config.label_max_chars, LABEL_MAX_CHARS);
    }

    #[test]
    fn test_full_file() {
        let config = BenchConfig::from_toml_str(
            r#"
            results_dir = "bench-results"
            repetitions = 10
            label_max_chars = 40
            "#,
        )
        .unwrap();

        assert_eq!(
            config,
            BenchConfig {
                results_dir: PathBuf::from("bench-results"),
                repetitions: 10,
                label_max_chars: 40,
            }
        );
    }

    #[test]
    fn test_zero_repetitions_rejected() {
        let err = BenchConfig::from_toml_str("repetitions = 0").unwrap_err();
        assert!(matches!(err, BenchError::InvalidRepetitions(0)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = BenchConfig::from_toml_str("repetition = 4").unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BenchConfig::load_or_default(dir.path().join(BenchConfig::DEFAULT_FILE))
            .unwrap();
        assert_eq!(config, BenchConfig::default());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BenchConfig::DEFAULT_FILE);
        std::fs::write(&path, "label_max_chars = 20\n").unwrap();

        assert_eq!(BenchConfig::load(&path).unwrap().label_max_chars, 20);
    }
}
