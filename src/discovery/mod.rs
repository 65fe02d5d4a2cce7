//! Worker Discovery Module
//!
//! Locates worker nodes at startup and during recovery using UDP broadcast.
//!
//! ## Overview
//! The coordinator does not know worker locations in advance. Each worker
//! binds a predictable logical port (`discovery_base_port + i`), and the
//! coordinator probes all of them through one shared broadcast socket. Any
//! datagram coming back is a presence signal carrying the replying worker's
//! network identity; the payload itself is never parsed.
//!
//! ## Responsibilities
//! - **Probing**: One broadcast datagram per logical worker port.
//! - **Collection**: Bounded waits for individual replies, and a bounded
//!   window that drains every reply queued during a recovery cycle.
//!
//! Deduplication against already-connected workers is the scheduler's job,
//! since the scheduler owns the table of known identities.

pub mod manager;
