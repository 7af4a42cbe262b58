//! Phase-scoped result files
//!
//! Each phase owns one append-only `results_<phase>.csv` file. A phase run
//! appends one row per successfully measured statement; loading tolerates
//! rows that no longer parse and reports them next to the good ones.

mod batch;
mod store;

pub use batch::{PhaseResults, RawResultRow, ResultBatch, ResultRecord};
pub use store::{RESULTS_HEADER, ResultStore};
