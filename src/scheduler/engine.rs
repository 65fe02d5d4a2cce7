//! Scheduler Engine
//!
//! Drives a complete run: worker enumeration, connection setup, task
//! partitioning, the event-multiplexed assignment/collection loop, and
//! failure-aware reassignment.

use crate::config::CoordinatorConfig;
use crate::connection::manager::ConnectionManager;
use crate::discovery::manager::DiscoveryManager;
use crate::tasks::registry::TaskRegistry;

use anyhow::{Result, ensure};
use std::net::SocketAddr;

/// Deterministic round-robin scan order over a fixed slot table: `start`
/// first, then each following slot once, wrapping at `len`.
///
/// Reassignment walks this order from a task's previous assignee, which
/// spreads orphaned tasks across survivors instead of piling them onto one
/// worker.
pub fn rotation_order(start: usize, len: usize) -> impl Iterator<Item = usize> {
    (0..len).map(move |offset| (start + offset) % len)
}

/// The coordinator's control loop. Sole owner of the discovery socket, the
/// worker slot table, and the task registry; everything runs on one task
/// with every suspension point explicitly bounded.
pub struct SchedulerEngine {
    pub config: CoordinatorConfig,
    pub discovery: DiscoveryManager,
    pub connections: ConnectionManager,
}

impl SchedulerEngine {
    pub async fn new(config: CoordinatorConfig) -> Result<Self> {
        let discovery = DiscoveryManager::bind(&config).await?;
        let connections = ConnectionManager::new(&config);

        Ok(Self {
            config,
            discovery,
            connections,
        })
    }

    /// Runs the whole computation and returns the aggregated integral.
    ///
    /// Fatal only when no worker can be discovered or connected at startup;
    /// once tasks exist, the loop keeps cycling between awaiting and
    /// recovery until every task is finished.
    pub async fn run(&mut self) -> Result<f64> {
        let peers = self.discover_workers().await?;

        let connected = self.connect_workers(&peers).await;
        ensure!(
            connected > 0,
            "No workers could be connected; nothing to schedule"
        );

        let mut registry = TaskRegistry::partition(
            self.config.range_start,
            self.config.range_end,
            self.connections.len(),
        )?;
        tracing::info!(
            "Partitioned [{}, {}] into {} tasks",
            self.config.range_start,
            self.config.range_end,
            registry.len()
        );

        self.assign_initial(&mut registry).await;

        while !registry.all_finished() {
            let progress = self.await_results(&mut registry).await;
            if !progress && !registry.all_finished() {
                self.recover(&mut registry).await?;
            }
        }

        let total = registry.total();
        tracing::info!("All {} tasks finished", registry.len());
        Ok(total)
    }

    /// Discovering: collect distinct worker identities until the expected
    /// count is reached or too many rebroadcast rounds pass with no new peers.
    async fn discover_workers(&mut self) -> Result<Vec<SocketAddr>> {
        tracing::info!("Discovering up to {} workers", self.config.worker_count);
        self.discovery.broadcast_probes().await?;

        let mut peers: Vec<SocketAddr> = Vec::new();
        let mut idle_rounds = 0;

        while peers.len() < self.config.worker_count {
            match self
                .discovery
                .poll_reply(self.config.discovery_timeout)
                .await
            {
                Some(identity) => {
                    if peers.contains(&identity) || self.connections.has_active(&identity) {
                        tracing::info!("Worker already known: {}", identity);
                        continue;
                    }
                    tracing::info!("Found worker: {}", identity);
                    peers.push(identity);
                    idle_rounds = 0;
                }
                None => {
                    idle_rounds += 1;
                    if idle_rounds > self.config.max_retries {
                        tracing::warn!(
                            "Discovery stalled; proceeding with {} of {} workers",
                            peers.len(),
                            self.config.worker_count
                        );
                        break;
                    }
                    tracing::info!("No new replies, rebroadcasting discovery probes");
                    self.discovery.broadcast_probes().await?;
                }
            }
        }

        ensure!(
            !peers.is_empty(),
            "No workers discovered; cannot create any tasks"
        );
        Ok(peers)
    }

    /// Connecting: one bounded-retry connect per discovered peer. Peers that
    /// exhaust their retries are dropped from the initial set.
    async fn connect_workers(&mut self, peers: &[SocketAddr]) -> usize {
        for &identity in peers {
            if self.connections.connect(identity).await.is_none() {
                tracing::warn!("Dropping worker {} from the initial set", identity);
            }
        }
        self.connections.active_count()
    }

    /// Assigning: dispatch each task to its same-indexed worker. A failed
    /// send leaves the task unfinished for the recovery cycle to place.
    async fn assign_initial(&mut self, registry: &mut TaskRegistry) {
        for index in 0..registry.len() {
            let msg = registry.assignment(index);
            if self.connections.send_assignment(index, &msg).await {
                tracing::info!("Task {} assigned to worker {}", index, index);
            } else {
                tracing::warn!(
                    "Initial assignment of task {} failed, deferring to recovery",
                    index
                );
            }
        }
    }

    /// Awaiting: one bounded readiness pass over the assignees of all
    /// unfinished tasks, draining every ready connection in slot order.
    ///
    /// Returns whether any task was newly finished; a pass without progress
    /// sends the loop into recovery.
    async fn await_results(&mut self, registry: &mut TaskRegistry) -> bool {
        let mut watched: Vec<usize> = registry
            .unfinished_indices()
            .into_iter()
            .map(|index| registry.task(index).assignee)
            .collect();
        watched.sort_unstable();
        watched.dedup();

        if !self
            .connections
            .wait_readable(&watched, self.config.await_timeout)
            .await
        {
            return false;
        }

        let mut progress = false;
        for &slot in &watched {
            for result in self.connections.try_drain(slot) {
                if result.index < 0 || !registry.contains(result.index as usize) {
                    tracing::warn!(
                        "Worker {} reported unknown task index {}",
                        slot,
                        result.index
                    );
                    continue;
                }

                let index = result.index as usize;
                if registry.mark_finished(index, result.value) {
                    tracing::info!(
                        "Task {} finished by worker {} (result {})",
                        index,
                        slot,
                        result.value
                    );
                    progress = true;
                }
            }
        }

        progress
    }

    /// Recovering: after a quiescence pause, rediscover workers, revive the
    /// slots of known identities that answer, and reassign every unfinished
    /// task to the first active worker in rotation order from its previous
    /// assignee.
    async fn recover(&mut self, registry: &mut TaskRegistry) -> Result<()> {
        tracing::info!("No progress observed, starting a recovery cycle");
        tokio::time::sleep(self.config.recovery_quiescence).await;

        self.discovery.broadcast_probes().await?;

        let replies = self.discovery.drain_replies(self.config.reply_window).await;
        for identity in replies {
            match self.connections.find(&identity) {
                Some(slot) if self.connections.slot(slot).active => {
                    tracing::info!("Worker already connected: {}", identity);
                }
                Some(slot) => {
                    tracing::info!("Rediscovered worker {} for slot {}", identity, slot);
                    if self.connections.connect(identity).await.is_none() {
                        tracing::warn!(
                            "Reconnection to {} failed, slot {} stays inactive",
                            identity,
                            slot
                        );
                    }
                }
                None => {
                    // The worker set is fixed at startup; late strangers are
                    // logged and ignored.
                    tracing::info!("Ignoring reply from unknown worker {}", identity);
                }
            }
        }

        let slot_count = self.connections.len();
        for index in registry.unfinished_indices() {
            let current = registry.task(index).assignee;
            let msg = registry.assignment(index);

            let mut placed = false;
            for candidate in rotation_order(current, slot_count) {
                if !self.connections.slot(candidate).active {
                    continue;
                }
                if self.connections.send_assignment(candidate, &msg).await {
                    registry.reassign(index, candidate);
                    tracing::info!("Task {} assigned to worker {}", index, candidate);
                    placed = true;
                    break;
                }
            }

            if !placed {
                tracing::warn!(
                    "No active worker accepted task {}, retrying next cycle",
                    index
                );
            }
        }

        Ok(())
    }
}
