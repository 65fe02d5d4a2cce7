//! Scheduler Module
//!
//! The coordinator's central control loop and the core of the system.
//!
//! ## Overview
//! One engine owns every socket and every piece of mutable state, and drives
//! the whole run through a fixed phase sequence:
//!
//! Discovering -> Connecting -> Assigning -> Awaiting <-> Recovering -> Aggregating
//!
//! ## Responsibilities
//! - **Discovery**: Enumerate workers via broadcast, bounded rebroadcast rounds.
//! - **Assignment**: Partition the domain once and dispatch one task per worker.
//! - **Collection**: Multiplex readiness across all live connections and
//!   ingest results, draining every ready connection per pass.
//! - **Recovery**: On a pass with no progress, rediscover, reconnect, and
//!   reassign orphaned tasks round-robin across the surviving workers.
//!
//! The loop exits only when every task is finished; per-connection failures
//! never propagate as errors, they only flip liveness flags.

pub mod engine;

#[cfg(test)]
mod tests;
