//! Worker Service
//!
//! Startup glue and the serve loop. The worker announces itself to the first
//! discovery probe it receives, accepts exactly one coordinator connection,
//! and then alternates between reading one assignment and writing one result
//! until the coordinator goes away. It never re-accepts; a replacement worker
//! is a fresh process on the same port.

use super::quadrature;
use crate::config::WorkerConfig;
use crate::protocol::{
    self, ASSIGNMENT_WIRE_LEN, DISCOVERY_ACK, TaskResult,
};

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};

/// One worker node.
pub struct WorkerService {
    config: WorkerConfig,
}

impl WorkerService {
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    /// Runs the worker to completion.
    ///
    /// The TCP listener is bound before the discovery ack goes out, so the
    /// coordinator can never race a connect against an unbound port.
    pub async fn run(self) -> Result<()> {
        let udp = UdpSocket::bind((self.config.bind_addr, self.config.port))
            .await
            .context("Failed to bind worker UDP socket")?;

        tracing::info!(
            "Worker listening for discovery probes on port {}",
            self.config.port
        );

        let mut buf = [0u8; 1024];
        let (_, coordinator) = udp
            .recv_from(&mut buf)
            .await
            .context("Failed to receive discovery probe")?;

        tracing::info!("Received probe from coordinator at {}", coordinator);

        let listener = TcpListener::bind((self.config.bind_addr, self.config.port))
            .await
            .context("Failed to bind worker TCP listener")?;

        udp.send_to(DISCOVERY_ACK, coordinator)
            .await
            .context("Failed to send discovery ack")?;

        let (mut stream, peer) = listener
            .accept()
            .await
            .context("Failed to accept coordinator connection")?;

        tracing::info!("Coordinator connected from {}", peer);

        loop {
            let mut frame = [0u8; ASSIGNMENT_WIRE_LEN];
            if let Err(e) = stream.read_exact(&mut frame).await {
                tracing::info!("Coordinator disconnected: {}", e);
                return Ok(());
            }

            let assignment = protocol::decode_assignment(&frame)?;
            tracing::info!(
                "Received task {}: integrate over [{}, {}]",
                assignment.index,
                assignment.start,
                assignment.end
            );

            let value = quadrature::integrate_midpoint(
                quadrature::square,
                assignment.start,
                assignment.end,
                self.config.samples,
            );

            let reply = TaskResult {
                index: assignment.index,
                value,
            };
            stream
                .write_all(&protocol::encode_result(&reply)?)
                .await
                .context("Failed to send task result")?;

            tracing::info!("Task {} completed, result {}", assignment.index, value);
        }
    }
}
