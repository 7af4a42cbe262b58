//! Error types for ZQLZ drivers

use thiserror::Error;

/// Error surfaced by a database driver
#[derive(Error, Debug)]
pub enum ZqlzError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Connection is closed")]
    Closed,
}

impl ZqlzError {
    /// Whether the error came from the database rejecting or failing a statement
    pub fn is_query_error(&self) -> bool {
        matches!(self, ZqlzError::Query(_))
    }
}

/// Result type alias for driver operations
pub type Result<T> = std::result::Result<T, ZqlzError>;
