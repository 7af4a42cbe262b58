//! SQLite connection implementation

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{Connection as RusqliteConnection, OpenFlags};
use std::path::Path;
use zqlz_core::{ColumnMeta, Connection, QueryResult, Result, Row, StatementResult, Value, ZqlzError};

/// SQLite connection wrapper.
///
/// The underlying handle lives behind an `Option` so `close` can release the
/// database file while the wrapper itself is still shared.
pub struct SqliteConnection {
    conn: Mutex<Option<RusqliteConnection>>,
}

impl SqliteConnection {
    /// Open (or create) a SQLite database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "opening SQLite database");

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            return Err(ZqlzError::Connection(format!(
                "Parent directory does not exist: {}",
                parent.display()
            )));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = RusqliteConnection::open_with_flags(path, flags).map_err(|e| {
            ZqlzError::Connection(format!(
                "Failed to open SQLite database at '{}': {}",
                path.display(),
                e
            ))
        })?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| ZqlzError::Connection(format!("Failed to set journal mode: {}", e)))?;

        Self::configure(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = RusqliteConnection::open_in_memory().map_err(|e| {
            ZqlzError::Connection(format!("Failed to open in-memory database: {}", e))
        })?;
        Self::configure(conn)
    }

    fn configure(conn: RusqliteConnection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| ZqlzError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        tracing::debug!("SQLite connection established");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Run a script of `;`-separated statements, e.g. a schema or seed file.
    ///
    /// Nothing is timed here; this exists to prepare a database before it is
    /// benchmarked.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        tracing::debug!("executing SQL batch");
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(ZqlzError::Closed)?;

        conn.execute_batch(sql)
            .map_err(|e| ZqlzError::Query(format!("Failed to execute batch: {}", e)))
    }
}

#[async_trait]
impl Connection for SqliteConnection {
    fn driver_name(&self) -> &str {
        "sqlite"
    }

    fn dialect_id(&self) -> Option<&'static str> {
        Some("sqlite")
    }

    #[tracing::instrument(skip(self, sql), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn execute(&self, sql: &str) -> Result<StatementResult> {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(ZqlzError::Closed)?;

        let affected = conn
            .execute(sql, [])
            .map_err(|e| ZqlzError::Query(format!("Failed to execute statement: {}", e)))?;

        tracing::debug!(affected_rows = affected, "statement executed");
        Ok(StatementResult::new(affected as u64))
    }

    #[tracing::instrument(skip(self, sql), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn query(&self, sql: &str) -> Result<QueryResult> {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(ZqlzError::Closed)?;

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| ZqlzError::Query(format!("Failed to prepare query: {}", e)))?;

        let columns: Vec<ColumnMeta> = stmt
            .columns()
            .iter()
            .map(|col| ColumnMeta {
                name: col.name().to_string(),
                data_type: col.decl_type().unwrap_or("DYNAMIC").to_string(),
            })
            .collect();
        let column_count = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt
            .query([])
            .map_err(|e| ZqlzError::Query(format!("Failed to execute query: {}", e)))?;

        // Every row is pulled off the cursor before returning.
        while let Some(row) = cursor
            .next()
            .map_err(|e| ZqlzError::Query(format!("Failed to fetch row: {}", e)))?
        {
            let mut values = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                values.push(rusqlite_to_value(row, idx)?);
            }
            rows.push(Row::new(values));
        }

        tracing::debug!(row_count = rows.len(), "query drained");
        Ok(QueryResult::with_rows(columns, rows))
    }

    async fn close(&self) -> Result<()> {
        let Some(conn) = self.conn.lock().take() else {
            return Ok(());
        };

        tracing::info!("closing SQLite connection");
        conn.close()
            .map_err(|(_, e)| ZqlzError::Connection(format!("Failed to close connection: {}", e)))
    }

    fn is_closed(&self) -> bool {
        self.conn.lock().is_none()
    }
}

fn rusqlite_to_value(row: &rusqlite::Row, idx: usize) -> Result<Value> {
    use rusqlite::types::ValueRef;

    let value_ref = row
        .get_ref(idx)
        .map_err(|e| ZqlzError::Query(e.to_string()))?;

    Ok(match value_ref {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(s) => Value::Text(String::from_utf8_lossy(s).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    })
}
