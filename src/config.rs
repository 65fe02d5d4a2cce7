//! Runtime Configuration
//!
//! Explicit configuration structures for both processes, replacing ambient
//! compile-time constants. Defaults match the historical deployment: the
//! coordinator listens for discovery replies on port 6000, workers are probed
//! on logical ports 6001 and up, and the run integrates over [0, 10] across
//! three workers with a retry ceiling of three.
//!
//! Every blocking point in the system is bounded by one of the durations
//! below, so a single unresponsive peer can never hang the run.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Settings for the coordinator process. Passed explicitly to every component
/// that needs one of its knobs; there is no global configuration state.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// UDP port the coordinator binds for discovery probes and replies.
    pub coordinator_port: u16,
    /// First logical worker port; worker `i` is probed on `discovery_base_port + i`.
    pub discovery_base_port: u16,
    /// Number of workers expected at startup. Also the upper bound on the
    /// worker slot table, which is fixed-size for the whole run.
    pub worker_count: usize,
    /// Ceiling on connect attempts per peer and on idle rebroadcast rounds.
    pub max_retries: u32,
    /// Lower bound of the integration domain.
    pub range_start: f64,
    /// Upper bound of the integration domain.
    pub range_end: f64,
    /// Local address the discovery socket binds to.
    pub bind_addr: IpAddr,
    /// Destination address for discovery probes. The limited broadcast
    /// address in production; a unicast address in tests.
    pub broadcast_addr: IpAddr,
    /// Wait per discovery poll during the initial discovery phase.
    pub discovery_timeout: Duration,
    /// Wait per readiness pass while awaiting results.
    pub await_timeout: Duration,
    /// Pause before each recovery rebroadcast.
    pub recovery_quiescence: Duration,
    /// Window for collecting discovery replies during a recovery cycle.
    pub reply_window: Duration,
    /// Bound on a single TCP connect attempt.
    pub connect_timeout: Duration,
    /// Bound on a single assignment write.
    pub write_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            coordinator_port: 6000,
            discovery_base_port: 6001,
            worker_count: 3,
            max_retries: 3,
            range_start: 0.0,
            range_end: 10.0,
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            broadcast_addr: IpAddr::V4(Ipv4Addr::BROADCAST),
            discovery_timeout: Duration::from_secs(1),
            await_timeout: Duration::from_secs(1),
            recovery_quiescence: Duration::from_secs(10),
            reply_window: Duration::from_millis(10),
            connect_timeout: Duration::from_secs(1),
            write_timeout: Duration::from_secs(1),
        }
    }
}

/// Settings for a worker process.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Port shared by the worker's UDP discovery listener and TCP task listener.
    pub port: u16,
    /// Local address both listeners bind to.
    pub bind_addr: IpAddr,
    /// Midpoint-rule sample count per assignment.
    pub samples: u32,
}

impl WorkerConfig {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            samples: 1000,
        }
    }
}
