//! Optimization phase identifiers

use std::fmt;
use std::str::FromStr;

use crate::BenchError;

/// A named optimization stage of the database under test.
///
/// The built-in stages cover the usual progression of a tuning exercise;
/// anything else is accepted as `Custom` so new stages need no code change.
/// Names are case-insensitive and always rendered lowercase, and they are
/// restricted to characters that are safe inside a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Baseline,
    Indexes,
    Columnstore,
    Partition,
    Compression,
    Custom(String),
}

impl Phase {
    /// The built-in stages, in their conventional order
    pub const BUILT_IN: [Phase; 5] = [
        Phase::Baseline,
        Phase::Indexes,
        Phase::Columnstore,
        Phase::Partition,
        Phase::Compression,
    ];

    /// Create a custom phase, validating its name
    pub fn custom(name: &str) -> Result<Self, BenchError> {
        name.parse()
    }

    pub fn as_str(&self) -> &str {
        match self {
            Phase::Baseline => "baseline",
            Phase::Indexes => "indexes",
            Phase::Columnstore => "columnstore",
            Phase::Partition => "partition",
            Phase::Compression => "compression",
            Phase::Custom(name) => name,
        }
    }

    pub fn is_baseline(&self) -> bool {
        matches!(self, Phase::Baseline)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let invalid = |reason| BenchError::InvalidPhaseName {
            name: s.to_string(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(invalid(
                "only letters, digits, '_' and '-' are allowed",
            ));
        }

        Ok(match name.as_str() {
            "baseline" => Phase::Baseline,
            "indexes" => Phase::Indexes,
            "columnstore" => Phase::Columnstore,
            "partition" => Phase::Partition,
            "compression" => Phase::Compression,
            _ => Phase::Custom(name),
        })
    }
}
