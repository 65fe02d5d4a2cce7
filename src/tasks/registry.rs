//! Task Registry
//!
//! Owns the partitioned work items and their completion/ownership state.
//! Mutated only by the scheduler loop; there is no concurrent access.

use super::types::Task;
use crate::protocol::TaskAssignment;

use anyhow::{Result, ensure};

/// The fixed set of tasks for one run.
#[derive(Debug)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
}

impl TaskRegistry {
    /// Splits `[range_start, range_end]` into `count` contiguous equal-width
    /// tasks. Boundary `i` sits at exactly `range_start + i * step` with
    /// `step = (range_end - range_start) / count`, so adjacent tasks share
    /// their boundary bit-for-bit and the partition covers the domain exactly
    /// once.
    ///
    /// Called exactly once per run, after discovery fixes the worker count.
    pub fn partition(range_start: f64, range_end: f64, count: usize) -> Result<Self> {
        ensure!(count > 0, "Cannot partition work across zero workers");

        let step = (range_end - range_start) / count as f64;
        let tasks = (0..count)
            .map(|i| {
                Task::new(
                    i,
                    range_start + i as f64 * step,
                    range_start + (i + 1) as f64 * step,
                )
            })
            .collect();

        Ok(Self { tasks })
    }

    /// Records a received result. Idempotent: once a task is finished, later
    /// calls change nothing and the stored result is kept.
    ///
    /// Returns `true` only when the task was newly finished, which is the
    /// scheduler's progress signal for the current readiness pass.
    pub fn mark_finished(&mut self, index: usize, result: f64) -> bool {
        let task = &mut self.tasks[index];
        if task.finished {
            tracing::debug!("Ignoring duplicate result for finished task {}", index);
            return false;
        }

        task.finished = true;
        task.result = result;
        true
    }

    /// Moves an unfinished task to a new owner without touching its
    /// completion state.
    pub fn reassign(&mut self, index: usize, new_assignee: usize) {
        self.tasks[index].assignee = new_assignee;
    }

    /// Builds the wire message for a task's current bounds.
    pub fn assignment(&self, index: usize) -> TaskAssignment {
        let task = &self.tasks[index];
        TaskAssignment {
            index: task.index as i32,
            start: task.start,
            end: task.end,
        }
    }

    pub fn task(&self, index: usize) -> &Task {
        &self.tasks[index]
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.tasks.len()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn all_finished(&self) -> bool {
        self.tasks.iter().all(|task| task.finished)
    }

    /// Indices of tasks still awaiting a result, in index order.
    pub fn unfinished_indices(&self) -> Vec<usize> {
        self.tasks
            .iter()
            .filter(|task| !task.finished)
            .map(|task| task.index)
            .collect()
    }

    /// Deterministic aggregate: sums results in index order.
    ///
    /// Only meaningful once every task is finished.
    pub fn total(&self) -> f64 {
        self.tasks.iter().map(|task| task.result).sum()
    }
}
