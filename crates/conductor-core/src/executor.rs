//! The external executor contract.
//!
//! The scheduler never performs a task's actual work; it hands a
//! [`TaskDescriptor`] to an injected [`TaskExecutor`] and waits for the
//! terminal [`TaskOutcome`], consuming 0..N progress reports along the
//! way. Production code supplies a real dispatcher; tests supply
//! deterministic fakes; [`SimulatedExecutor`] is the placeholder used when
//! nothing is injected.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::models::TaskId;

/// The slice of a task an executor is allowed to see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// Task identifier, echoed back in progress updates
    pub id: TaskId,

    /// What the task is supposed to accomplish
    pub description: String,

    /// Which external agent should perform the work, if any
    pub assigned_agent: Option<String>,
}

/// Terminal outcome of one task execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutcome {
    /// Whether the work succeeded
    pub success: bool,

    /// Output artifacts to attach to the task
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,

    /// Failure message when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskOutcome {
    /// A successful outcome carrying the given artifacts.
    pub fn success(outputs: Vec<String>) -> Self {
        Self {
            success: true,
            outputs,
            error: None,
        }
    }

    /// A failed outcome carrying the given error message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            outputs: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Progress update flowing from a running executor back to the scheduler.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProgressUpdate {
    pub task_id: TaskId,
    pub progress: f64,
}

/// Handle an executor uses to report incremental progress.
///
/// Values are clamped to 0..=100. Reporting is best-effort and never
/// blocks the executor; updates sent after the scheduler stopped listening
/// are dropped.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    task_id: TaskId,
    tx: mpsc::UnboundedSender<ProgressUpdate>,
}

impl ProgressReporter {
    pub(crate) fn new(task_id: TaskId, tx: mpsc::UnboundedSender<ProgressUpdate>) -> Self {
        Self { task_id, tx }
    }

    /// Reports completion percentage for the running task.
    pub fn report(&self, progress: f64) {
        let _ = self.tx.send(ProgressUpdate {
            task_id: self.task_id,
            progress: progress.clamp(0.0, 100.0),
        });
    }
}

/// Strategy interface for performing a task's actual work.
///
/// Implementations receive the descriptor and a progress handle, and
/// resolve to exactly one terminal outcome. Infrastructure failures may be
/// surfaced as `Err`; both an `Err` and an unsuccessful outcome mark the
/// task failed.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Performs the work described by `task`.
    async fn execute(
        &self,
        task: TaskDescriptor,
        progress: ProgressReporter,
    ) -> anyhow::Result<TaskOutcome>;
}

/// Placeholder executor that animates progress in ten fixed steps.
///
/// Mirrors the behavior the scheduler is developed against before a real
/// dispatcher exists: sleep, report, repeat, always succeed.
#[derive(Debug, Clone)]
pub struct SimulatedExecutor {
    /// Delay between progress steps
    pub step_delay: Duration,
}

impl SimulatedExecutor {
    const STEPS: u32 = 10;

    /// Creates a simulator with the given step delay.
    pub fn new(step_delay: Duration) -> Self {
        Self { step_delay }
    }
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new(Duration::from_millis(50))
    }
}

#[async_trait]
impl TaskExecutor for SimulatedExecutor {
    async fn execute(
        &self,
        task: TaskDescriptor,
        progress: ProgressReporter,
    ) -> anyhow::Result<TaskOutcome> {
        for step in 1..=Self::STEPS {
            tokio::time::sleep(self.step_delay).await;
            progress.report(f64::from(step) * 100.0 / f64::from(Self::STEPS));
        }
        Ok(TaskOutcome::success(vec![format!(
            "simulated: {}",
            task.description
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn simulated_executor_reports_ten_steps() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let reporter = ProgressReporter::new(1, tx);
        let executor = SimulatedExecutor::default();

        let outcome = executor
            .execute(
                TaskDescriptor {
                    id: 1,
                    description: "build".to_string(),
                    assigned_agent: None,
                },
                reporter,
            )
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.outputs, vec!["simulated: build".to_string()]);

        let mut values = Vec::new();
        while let Ok(update) = rx.try_recv() {
            assert_eq!(update.task_id, 1);
            values.push(update.progress);
        }
        assert_eq!(values.len(), 10);
        assert_eq!(values.first(), Some(&10.0));
        assert_eq!(values.last(), Some(&100.0));
    }

    #[test]
    fn reporter_clamps_out_of_range_values() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let reporter = ProgressReporter::new(2, tx);
        reporter.report(-5.0);
        reporter.report(250.0);

        assert_eq!(rx.try_recv().unwrap().progress, 0.0);
        assert_eq!(rx.try_recv().unwrap().progress, 100.0);
    }
}
