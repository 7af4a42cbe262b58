//! SQLite connection implementation for ZQLZ

mod connection;

pub use connection::SqliteConnection;
