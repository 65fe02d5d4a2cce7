//! Discovery Manager
//!
//! Owns the coordinator's UDP socket: sends probes out, collects replies in.

use crate::config::CoordinatorConfig;
use crate::protocol::DISCOVERY_PROBE;

use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{Instant, timeout};

/// Sends broadcast probes and listens for worker replies.
pub struct DiscoveryManager {
    socket: UdpSocket,
    broadcast_addr: IpAddr,
    base_port: u16,
    worker_count: usize,
}

impl DiscoveryManager {
    /// Binds the discovery socket and enables broadcast on it.
    ///
    /// Socket setup failures are fatal to the run; there is nothing to
    /// schedule without a discovery channel.
    pub async fn bind(config: &CoordinatorConfig) -> Result<Self> {
        let socket = UdpSocket::bind((config.bind_addr, config.coordinator_port))
            .await
            .context("Failed to bind discovery socket")?;
        socket
            .set_broadcast(true)
            .context("Failed to enable broadcast on discovery socket")?;

        tracing::info!(
            "Discovery socket bound on {}",
            socket.local_addr().context("Discovery socket has no local address")?
        );

        Ok(Self {
            socket,
            broadcast_addr: config.broadcast_addr,
            base_port: config.discovery_base_port,
            worker_count: config.worker_count,
        })
    }

    /// Sends one probe datagram per logical worker port.
    ///
    /// Send errors are not expected in the target environment and abort the
    /// run if they occur.
    pub async fn broadcast_probes(&self) -> Result<()> {
        for i in 0..self.worker_count {
            let port = self.base_port + i as u16;
            let target = SocketAddr::new(self.broadcast_addr, port);

            self.socket
                .send_to(DISCOVERY_PROBE, target)
                .await
                .with_context(|| format!("Failed to send discovery probe to {}", target))?;

            tracing::info!("Sent broadcast to discover workers on port {}", port);
        }

        Ok(())
    }

    /// Waits up to `wait` for a single discovery reply.
    ///
    /// Returns the replying peer's network identity, or `None` when the wait
    /// expires or the receive fails.
    pub async fn poll_reply(&self, wait: Duration) -> Option<SocketAddr> {
        let mut buf = [0u8; 1024];

        match timeout(wait, self.socket.recv_from(&mut buf)).await {
            Ok(Ok((_, peer))) => Some(peer),
            Ok(Err(e)) => {
                tracing::warn!("Failed to receive discovery reply: {}", e);
                None
            }
            Err(_) => None,
        }
    }

    /// Drains every reply that arrives within `window`, deduplicated.
    ///
    /// A recovery cycle processes all pending replies rather than one per
    /// cycle; the window keeps the drain bounded regardless of traffic.
    pub async fn drain_replies(&self, window: Duration) -> Vec<SocketAddr> {
        let deadline = Instant::now() + window;
        let mut peers: Vec<SocketAddr> = Vec::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            match self.poll_reply(remaining).await {
                Some(peer) => {
                    if !peers.contains(&peer) {
                        peers.push(peer);
                    }
                }
                None => break,
            }
        }

        peers
    }

    /// The socket's bound address; workers reply here.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket
            .local_addr()
            .context("Discovery socket has no local address")
    }
}
