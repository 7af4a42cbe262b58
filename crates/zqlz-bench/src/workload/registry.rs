//! Phase → statements registry

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use super::Statement;
use crate::{BenchError, Phase, Result};

/// Where a resolved workload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadSource {
    /// The phase registered statements of its own
    Own,
    /// The phase is registered with no statements and borrows baseline's
    BaselineFallback,
}

/// Statements to run for a phase, as resolved by the registry
#[derive(Debug, Clone)]
pub struct ResolvedWorkload<'a> {
    pub phase: Phase,
    pub source: WorkloadSource,
    pub statements: &'a [Statement],
}

impl ResolvedWorkload<'_> {
    pub fn is_fallback(&self) -> bool {
        self.source == WorkloadSource::BaselineFallback
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Maps each registered phase to its ordered statement list.
///
/// Built once and handed to the orchestrator; there is no global workload
/// table. Registration order is preserved for listing.
#[derive(Debug, Clone, Default)]
pub struct WorkloadRegistry {
    phases: Vec<(Phase, Vec<Statement>)>,
}

/// On-disk workload definition
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorkloadFile {
    phases: IndexMap<String, Vec<String>>,
}

impl WorkloadRegistry {
    pub fn builder() -> WorkloadRegistryBuilder {
        WorkloadRegistryBuilder::default()
    }

    /// Parse a TOML workload definition.
    ///
    /// ```toml
    /// [phases]
    /// baseline = ["SELECT ...", "UPDATE ..."]
    /// indexes = []
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: WorkloadFile =
            toml::from_str(source).map_err(|e| BenchError::Workload(e.to_string()))?;

        let mut builder = Self::builder();
        for (name, statements) in file.phases {
            builder = builder.phase(name.parse()?, statements);
        }
        builder.build()
    }

    /// Load a TOML workload definition from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            BenchError::Workload(format!("cannot read {}: {}", path.display(), e))
        })?;

        let registry = Self::from_toml_str(&source)?;
        tracing::debug!(
            path = %path.display(),
            phases = registry.len(),
            "workload loaded"
        );
        Ok(registry)
    }

    /// Resolve the statements to run for `phase`.
    ///
    /// A phase registered with an empty list resolves to baseline's list and
    /// is marked `WorkloadSource::BaselineFallback`. A phase that was never
    /// registered is an error.
    pub fn resolve(&self, phase: &Phase) -> Result<ResolvedWorkload<'_>> {
        let statements = self
            .statements_for(phase)
            .ok_or_else(|| BenchError::UnknownPhase(phase.clone()))?;

        if !statements.is_empty() || phase.is_baseline() {
            return Ok(ResolvedWorkload {
                phase: phase.clone(),
                source: WorkloadSource::Own,
                statements,
            });
        }

        let baseline = self
            .statements_for(&Phase::Baseline)
            .ok_or(BenchError::UnknownPhase(Phase::Baseline))?;

        tracing::debug!(phase = %phase, "phase has no workload of its own, using baseline's");
        Ok(ResolvedWorkload {
            phase: phase.clone(),
            source: WorkloadSource::BaselineFallback,
            statements: baseline,
        })
    }

    /// Registered phases, in registration order
    pub fn phases(&self) -> impl Iterator<Item = &Phase> {
        self.phases.iter().map(|(phase, _)| phase)
    }

    pub fn contains(&self, phase: &Phase) -> bool {
        self.statements_for(phase).is_some()
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    fn statements_for(&self, phase: &Phase) -> Option<&[Statement]> {
        self.phases
            .iter()
            .find(|(registered, _)| registered == phase)
            .map(|(_, statements)| statements.as_slice())
    }
}

/// Builder for [`WorkloadRegistry`]
#[derive(Debug, Clone, Default)]
pub struct WorkloadRegistryBuilder {
    phases: Vec<(Phase, Vec<String>)>,
}

impl WorkloadRegistryBuilder {
    /// Register `phase` with its statements, in execution order.
    ///
    /// Pass an empty list to make the phase reuse baseline's workload.
    pub fn phase<I, S>(mut self, phase: Phase, statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phases
            .push((phase, statements.into_iter().map(Into::into).collect()));
        self
    }

    /// Validate and build the registry.
    ///
    /// Fails on a phase registered twice or on a blank statement.
    pub fn build(self) -> Result<WorkloadRegistry> {
        let mut phases: Vec<(Phase, Vec<Statement>)> = Vec::with_capacity(self.phases.len());

        for (phase, texts) in self.phases {
            if phases.iter().any(|(registered, _)| *registered == phase) {
                return Err(BenchError::Workload(format!(
                    "phase '{}' is registered more than once",
                    phase
                )));
            }

            let mut statements = Vec::with_capacity(texts.len());
            for (position, text) in texts.into_iter().enumerate() {
                let text = text.trim();
                if text.is_empty() {
                    return Err(BenchError::Workload(format!(
                        "phase '{}' statement #{} is blank",
                        phase,
                        position + 1
                    )));
                }
                statements.push(Statement::new(position, text));
            }

            phases.push((phase, statements));
        }

        Ok(WorkloadRegistry { phases })
    }
}
