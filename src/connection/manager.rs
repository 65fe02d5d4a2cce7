//! Connection Manager
//!
//! Establishes and tracks one stream connection per discovered worker, with
//! bounded connect retries, time-bounded writes, and non-blocking reads. All
//! I/O here is bounded so a stalled peer can never stall the scheduler loop.

use super::types::WorkerHandle;
use crate::config::CoordinatorConfig;
use crate::protocol::{self, RESULT_WIRE_LEN, TaskAssignment, TaskResult};

use futures::future::select_all;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// The coordinator's table of worker slots.
pub struct ConnectionManager {
    slots: Vec<WorkerHandle>,
    max_retries: u32,
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl ConnectionManager {
    pub fn new(config: &CoordinatorConfig) -> Self {
        Self {
            slots: Vec::with_capacity(config.worker_count),
            max_retries: config.max_retries,
            connect_timeout: config.connect_timeout,
            write_timeout: config.write_timeout,
        }
    }

    pub fn slots(&self) -> &[WorkerHandle] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> &WorkerHandle {
        &self.slots[index]
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }

    /// Slot index for a network identity, if this identity has been seen.
    pub fn find(&self, identity: &SocketAddr) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.identity == *identity)
    }

    /// True when the identity already maps to a healthy slot. Discovery uses
    /// this to drop duplicate replies without touching the slot table.
    pub fn has_active(&self, identity: &SocketAddr) -> bool {
        self.find(identity)
            .map(|index| self.slots[index].active)
            .unwrap_or(false)
    }

    /// Connects to a worker, retrying up to the configured ceiling with no
    /// backoff between attempts.
    ///
    /// On success the identity's slot is created (first discovery) or revived
    /// in place (rediscovery), and its index is returned. On exhaustion no
    /// new slot is created and an existing slot stays inactive.
    pub async fn connect(&mut self, identity: SocketAddr) -> Option<usize> {
        let stream = self.dial(identity).await?;

        match self.find(&identity) {
            Some(index) => {
                self.slots[index].revive(stream);
                tracing::info!("Reconnected to worker {} (slot {})", identity, index);
                Some(index)
            }
            None => {
                self.slots.push(WorkerHandle::new(identity, stream));
                let index = self.slots.len() - 1;
                tracing::info!("Connected to worker {} (slot {})", identity, index);
                Some(index)
            }
        }
    }

    async fn dial(&self, identity: SocketAddr) -> Option<TcpStream> {
        for attempt in 1..=self.max_retries {
            match timeout(self.connect_timeout, TcpStream::connect(identity)).await {
                Ok(Ok(stream)) => return Some(stream),
                Ok(Err(e)) => {
                    tracing::warn!(
                        "Connection to {} failed (attempt {}/{}): {}",
                        identity,
                        attempt,
                        self.max_retries,
                        e
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        "Connection to {} timed out (attempt {}/{})",
                        identity,
                        attempt,
                        self.max_retries
                    );
                }
            }
        }

        tracing::warn!("Giving up on worker {} after {} attempts", identity, self.max_retries);
        None
    }

    /// Writes one assignment frame, bounded by the write timeout.
    ///
    /// Any error or timeout kills the slot; the caller must not retry the
    /// write on this connection.
    pub async fn send_assignment(&mut self, index: usize, msg: &TaskAssignment) -> bool {
        let frame = match protocol::encode_assignment(msg) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to encode assignment: {}", e);
                return false;
            }
        };

        let slot = &mut self.slots[index];
        let Some(stream) = slot.stream.as_mut() else {
            return false;
        };

        let outcome = timeout(self.write_timeout, stream.write_all(&frame)).await;
        match outcome {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!("Write to worker {} failed: {}", slot.identity, e);
                slot.mark_dead();
                false
            }
            Err(_) => {
                tracing::warn!("Write to worker {} timed out", slot.identity);
                slot.mark_dead();
                false
            }
        }
    }

    /// Waits up to `wait` for any watched connection to become readable.
    ///
    /// An empty or fully-disconnected watch set degrades to a plain bounded
    /// sleep, so the caller's pass still takes at most `wait`.
    pub async fn wait_readable(&self, watched: &[usize], wait: Duration) -> bool {
        let readables: Vec<_> = watched
            .iter()
            .filter_map(|&index| self.slots.get(index))
            .filter_map(|slot| slot.stream.as_ref())
            .map(|stream| Box::pin(stream.readable()))
            .collect();

        if readables.is_empty() {
            tokio::time::sleep(wait).await;
            return false;
        }

        timeout(wait, select_all(readables)).await.is_ok()
    }

    /// Non-blocking drain of one slot's connection.
    ///
    /// Reads whatever is available into the slot's rolling buffer and decodes
    /// every complete result frame out of it. A zero-length read, an I/O
    /// error, or an undecodable frame demotes the slot; a partial frame stays
    /// buffered for the next pass. Frames that arrived before a close are
    /// still returned, so a worker that answers and then dies loses nothing.
    pub fn try_drain(&mut self, index: usize) -> Vec<TaskResult> {
        let slot = &mut self.slots[index];
        let Some(stream) = slot.stream.as_ref() else {
            return Vec::new();
        };

        let mut dead = false;
        let mut buf = [0u8; 1024];
        loop {
            match stream.try_read(&mut buf) {
                Ok(0) => {
                    tracing::warn!("Worker {} closed the connection", slot.identity);
                    dead = true;
                    break;
                }
                Ok(n) => slot.rx.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    tracing::warn!("Read from worker {} failed: {}", slot.identity, e);
                    dead = true;
                    break;
                }
            }
        }

        let mut results = Vec::new();
        while slot.rx.len() >= RESULT_WIRE_LEN {
            let frame: Vec<u8> = slot.rx.drain(..RESULT_WIRE_LEN).collect();
            match protocol::decode_result(&frame) {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::warn!("Undecodable frame from worker {}: {}", slot.identity, e);
                    dead = true;
                    break;
                }
            }
        }

        if dead {
            slot.mark_dead();
        }

        results
    }
}
