//! ZQLZ Core - connection abstractions shared by drivers and the benchmark engine
//!
//! This crate defines the seam between a live database and everything that
//! measures it:
//!
//! - `Connection` - Trait implemented by database drivers
//! - `QueryResult` / `StatementResult` - What a statement produced
//! - `Value` / `Row` - Driver-neutral cell and row types
//! - `ZqlzError` - Error type surfaced by drivers

mod connection;
mod error;
mod types;

pub use connection::*;
pub use error::*;
pub use types::*;
