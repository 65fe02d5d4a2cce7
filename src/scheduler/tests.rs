//! Scheduler Module Tests
//!
//! End-to-end runs over loopback: real worker processes (as tokio tasks),
//! plus scripted misbehaving workers for the failure scenarios.
//!
//! ## Test Scopes
//! - **Rotation**: Determinism of the round-robin reassignment order.
//! - **Happy Path**: Three workers covering the full integral.
//! - **Discovery Edge Cases**: Duplicate replies, unreachable peers, zero workers.
//! - **Fault Tolerance**: A worker dying mid-task with its task reassigned.
//!
//! Each test uses its own discovery port range so parallel tests never share
//! sockets.

#[cfg(test)]
mod tests {
    use crate::config::{CoordinatorConfig, WorkerConfig};
    use crate::protocol::{self, ASSIGNMENT_WIRE_LEN, DISCOVERY_ACK};
    use crate::scheduler::engine::{SchedulerEngine, rotation_order};
    use crate::worker::service::WorkerService;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, UdpSocket};

    const FULL_INTEGRAL: f64 = 1000.0 / 3.0; // ∫₀¹⁰ x² dx

    fn test_config(base_port: u16, worker_count: usize) -> CoordinatorConfig {
        CoordinatorConfig {
            coordinator_port: 0,
            discovery_base_port: base_port,
            worker_count,
            max_retries: 2,
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            broadcast_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            discovery_timeout: Duration::from_millis(200),
            await_timeout: Duration::from_millis(200),
            recovery_quiescence: Duration::from_millis(50),
            reply_window: Duration::from_millis(50),
            connect_timeout: Duration::from_millis(500),
            write_timeout: Duration::from_millis(500),
            ..CoordinatorConfig::default()
        }
    }

    fn spawn_worker(port: u16) {
        let config = WorkerConfig {
            port,
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            samples: 1000,
        };
        tokio::spawn(WorkerService::new(config).run());
    }

    // ============================================================
    // ROTATION ORDER TESTS
    // ============================================================

    #[test]
    fn test_rotation_order_starts_at_previous_assignee_and_wraps() {
        let order: Vec<usize> = rotation_order(1, 3).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_rotation_order_visits_every_slot_once() {
        for start in 0..5 {
            let mut order: Vec<usize> = rotation_order(start, 5).collect();
            assert_eq!(order[0], start);
            order.sort_unstable();
            assert_eq!(order, vec![0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_rotation_order_over_empty_table_is_empty() {
        assert_eq!(rotation_order(0, 0).count(), 0);
    }

    // ============================================================
    // HAPPY PATH
    // ============================================================

    #[tokio::test]
    async fn test_three_workers_compute_full_integral() {
        let base_port = 46410;
        for i in 0..3 {
            spawn_worker(base_port + i);
        }

        let mut engine = SchedulerEngine::new(test_config(base_port, 3))
            .await
            .unwrap();
        let total = engine.run().await.unwrap();

        assert!((total - FULL_INTEGRAL).abs() < 1e-2);
        assert_eq!(engine.connections.len(), 3);
        assert_eq!(engine.connections.active_count(), 3);
    }

    // ============================================================
    // DISCOVERY EDGE CASES
    // ============================================================

    #[tokio::test]
    async fn test_duplicate_discovery_reply_adds_no_worker() {
        let base_port = 46420;

        // A worker that acks the first probe twice, then serves normally.
        tokio::spawn(async move {
            let udp = UdpSocket::bind((Ipv4Addr::LOCALHOST, base_port))
                .await
                .unwrap();
            let mut buf = [0u8; 64];
            let (_, coordinator) = udp.recv_from(&mut buf).await.unwrap();

            let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, base_port))
                .await
                .unwrap();
            udp.send_to(DISCOVERY_ACK, coordinator).await.unwrap();
            udp.send_to(DISCOVERY_ACK, coordinator).await.unwrap();

            let (mut stream, _) = listener.accept().await.unwrap();
            loop {
                let mut frame = [0u8; ASSIGNMENT_WIRE_LEN];
                if stream.read_exact(&mut frame).await.is_err() {
                    return;
                }
                let assignment = protocol::decode_assignment(&frame).unwrap();
                let value = crate::worker::quadrature::integrate_midpoint(
                    crate::worker::quadrature::square,
                    assignment.start,
                    assignment.end,
                    1000,
                );
                let reply = protocol::encode_result(&protocol::TaskResult {
                    index: assignment.index,
                    value,
                })
                .unwrap();
                stream.write_all(&reply).await.unwrap();
            }
        });

        // Expecting two workers, but only the double-acker exists: the second
        // ack must be deduplicated, not counted as a second worker.
        let mut engine = SchedulerEngine::new(test_config(base_port, 2))
            .await
            .unwrap();
        let total = engine.run().await.unwrap();

        assert_eq!(engine.connections.len(), 1);
        assert!((total - FULL_INTEGRAL).abs() < 1e-2);
    }

    #[tokio::test]
    async fn test_unreachable_peer_is_dropped_from_initial_set() {
        let base_port = 46430;
        spawn_worker(base_port);

        // Acks the probe but never opens a TCP listener, so every connect
        // attempt is refused.
        tokio::spawn(async move {
            let udp = UdpSocket::bind((Ipv4Addr::LOCALHOST, base_port + 1))
                .await
                .unwrap();
            let mut buf = [0u8; 64];
            let (_, coordinator) = udp.recv_from(&mut buf).await.unwrap();
            udp.send_to(DISCOVERY_ACK, coordinator).await.unwrap();
            // Stay alive so the port remains closed rather than unprobed.
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let mut engine = SchedulerEngine::new(test_config(base_port, 2))
            .await
            .unwrap();
        let total = engine.run().await.unwrap();

        // The run proceeds with the reachable subset, which then owns the
        // whole domain.
        assert_eq!(engine.connections.len(), 1);
        assert!((total - FULL_INTEGRAL).abs() < 1e-2);
    }

    #[tokio::test]
    async fn test_zero_workers_is_fatal() {
        let mut engine = SchedulerEngine::new(test_config(46440, 2))
            .await
            .unwrap();

        let outcome = engine.run().await;

        assert!(outcome.is_err());
    }

    // ============================================================
    // FAULT TOLERANCE
    // ============================================================

    #[tokio::test]
    async fn test_dead_worker_task_is_reassigned_to_survivor() {
        let base_port = 46450;
        spawn_worker(base_port);

        // Accepts its assignment and then dies without answering.
        tokio::spawn(async move {
            let udp = UdpSocket::bind((Ipv4Addr::LOCALHOST, base_port + 1))
                .await
                .unwrap();
            let mut buf = [0u8; 64];
            let (_, coordinator) = udp.recv_from(&mut buf).await.unwrap();

            let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, base_port + 1))
                .await
                .unwrap();
            udp.send_to(DISCOVERY_ACK, coordinator).await.unwrap();

            let (mut stream, _) = listener.accept().await.unwrap();
            let mut frame = [0u8; ASSIGNMENT_WIRE_LEN];
            let _ = stream.read_exact(&mut frame).await;
            // Connection and sockets drop here: mid-task failure.
        });

        let mut engine = SchedulerEngine::new(test_config(base_port, 2))
            .await
            .unwrap();
        let total = engine.run().await.unwrap();

        // Both subintervals were computed exactly once in the aggregate even
        // though one worker never answered.
        assert!((total - FULL_INTEGRAL).abs() < 1e-2);
        assert_eq!(engine.connections.len(), 2);
        assert_eq!(engine.connections.active_count(), 1);
    }
}
