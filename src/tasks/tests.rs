//! Task Module Tests
//!
//! Validates the partitioning math and the registry's state transitions.
//!
//! ## Test Scopes
//! - **Partitioning**: Coverage, contiguity, and boundary placement for a range of worker counts.
//! - **Completion**: Idempotence of `mark_finished` and result durability.
//! - **Ownership**: Reassignment leaving completion state untouched.
//! - **Aggregation**: Deterministic index-order summation.

#[cfg(test)]
mod tests {
    use crate::tasks::registry::TaskRegistry;

    // ============================================================
    // PARTITIONING TESTS
    // ============================================================

    #[test]
    fn test_partition_covers_domain_for_all_worker_counts() {
        let (a, b) = (0.0, 10.0);

        for count in 1..=8 {
            let registry = TaskRegistry::partition(a, b, count).unwrap();
            let step = (b - a) / count as f64;

            assert_eq!(registry.len(), count);

            for i in 0..count {
                let task = registry.task(i);
                // Boundary i = a + i * step, exactly.
                assert_eq!(task.start, a + i as f64 * step);
                assert_eq!(task.end, a + (i + 1) as f64 * step);
                assert_eq!(task.assignee, i);
                assert!(!task.finished);
            }

            // Contiguous and non-overlapping: each boundary is shared bit-for-bit.
            for i in 1..count {
                assert_eq!(registry.task(i - 1).end, registry.task(i).start);
            }

            assert_eq!(registry.task(0).start, a);
            assert!((registry.task(count - 1).end - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_partition_three_workers_over_zero_ten() {
        let registry = TaskRegistry::partition(0.0, 10.0, 3).unwrap();
        let step = 10.0 / 3.0;

        assert!((registry.task(0).end - step).abs() < 1e-12);
        assert!((registry.task(1).start - step).abs() < 1e-12);
        assert!((registry.task(1).end - 2.0 * step).abs() < 1e-12);
        assert!((registry.task(2).end - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_partition_zero_workers_is_an_error() {
        assert!(TaskRegistry::partition(0.0, 10.0, 0).is_err());
    }

    // ============================================================
    // COMPLETION TESTS
    // ============================================================

    #[test]
    fn test_mark_finished_is_idempotent() {
        let mut registry = TaskRegistry::partition(0.0, 10.0, 2).unwrap();

        assert!(registry.mark_finished(0, 4.5));
        assert!(registry.task(0).finished);
        assert_eq!(registry.task(0).result, 4.5);

        // A late duplicate must neither flip the flag nor overwrite the result.
        assert!(!registry.mark_finished(0, 99.0));
        assert!(registry.task(0).finished);
        assert_eq!(registry.task(0).result, 4.5);
    }

    #[test]
    fn test_all_finished_tracks_every_task() {
        let mut registry = TaskRegistry::partition(0.0, 10.0, 3).unwrap();

        assert!(!registry.all_finished());
        registry.mark_finished(0, 1.0);
        registry.mark_finished(2, 3.0);
        assert!(!registry.all_finished());
        assert_eq!(registry.unfinished_indices(), vec![1]);

        registry.mark_finished(1, 2.0);
        assert!(registry.all_finished());
        assert!(registry.unfinished_indices().is_empty());
    }

    // ============================================================
    // OWNERSHIP TESTS
    // ============================================================

    #[test]
    fn test_reassign_changes_owner_only() {
        let mut registry = TaskRegistry::partition(0.0, 10.0, 3).unwrap();

        registry.reassign(1, 2);

        let task = registry.task(1);
        assert_eq!(task.assignee, 2);
        assert!(!task.finished);
        assert_eq!(task.start, registry.assignment(1).start);
        assert_eq!(task.end, registry.assignment(1).end);
    }

    #[test]
    fn test_assignment_carries_task_bounds() {
        let registry = TaskRegistry::partition(2.0, 8.0, 2).unwrap();

        let msg = registry.assignment(1);
        assert_eq!(msg.index, 1);
        assert_eq!(msg.start, 5.0);
        assert_eq!(msg.end, 8.0);
    }

    // ============================================================
    // AGGREGATION TESTS
    // ============================================================

    #[test]
    fn test_total_is_exact_sum_of_stub_results() {
        let mut registry = TaskRegistry::partition(0.0, 10.0, 3).unwrap();

        registry.mark_finished(0, 1.0);
        registry.mark_finished(1, 2.0);
        registry.mark_finished(2, 3.0);

        assert!(registry.all_finished());
        assert_eq!(registry.total(), 6.0);
    }
}
