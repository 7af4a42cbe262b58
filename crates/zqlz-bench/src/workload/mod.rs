//! Workload definitions
//!
//! A workload is the ordered list of statements benchmarked for a phase.
//! By convention row-returning statements come first and mutating ones last,
//! so reads are timed against unmodified data. The registry never reorders
//! what it is given.

mod registry;
mod statement;
#[cfg(test)]
mod tests;

pub use registry::{ResolvedWorkload, WorkloadRegistry, WorkloadRegistryBuilder, WorkloadSource};
pub use statement::Statement;
