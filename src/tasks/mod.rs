//! Task Partitioning and Tracking
//!
//! The coordinator's record of the work to be done. The integration domain is
//! split once, after the initial discovery phase fixes the worker count, into
//! one contiguous subinterval per connected worker; from then on the registry
//! tracks each subinterval's ownership and completion until the whole run is
//! finished.
//!
//! ## Invariants
//! - The task set is created atomically and never grows, shrinks, or re-splits.
//! - An unfinished task has exactly one current assignee at any instant.
//! - Once `finished` is set it never reverts, and the stored result is never
//!   overwritten by late duplicates.
//!
//! ## Submodules
//! - **`types`**: The `Task` record.
//! - **`registry`**: The `TaskRegistry` owning all tasks and their mutations.

pub mod registry;
pub mod types;

#[cfg(test)]
mod tests;
