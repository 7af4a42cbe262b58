use std::sync::Arc;

/// One workload statement.
///
/// Statements are identified by their 0-based position in the workload, not
/// by their text: two identical statements in one workload are still two
/// separate entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    position: usize,
    text: Arc<str>,
}

impl Statement {
    pub fn new(position: usize, text: impl Into<Arc<str>>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }

    /// 0-based position within the workload
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
