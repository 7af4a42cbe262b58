//! Connection trait

use crate::{QueryResult, Result, StatementResult};
use async_trait::async_trait;

/// A live database connection.
///
/// Connections are handed to consumers already established; nothing behind
/// this trait knows about connection strings or credentials. Calls on a
/// single connection are expected to be awaited one at a time.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "sqlite", "postgresql", "mssql")
    fn driver_name(&self) -> &str;

    /// SQL dialect spoken by this connection, if known.
    ///
    /// Used to pick a parser dialect when inspecting statement shape.
    fn dialect_id(&self) -> Option<&'static str> {
        None
    }

    /// Execute a statement that does not return rows (INSERT/UPDATE/DELETE/DDL).
    ///
    /// Returns once the database has acknowledged completion.
    async fn execute(&self, sql: &str) -> Result<StatementResult>;

    /// Execute a row-returning statement and fetch every row of its result set.
    async fn query(&self, sql: &str) -> Result<QueryResult>;

    /// Release the connection. Calling `close` more than once is a no-op.
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;
}
