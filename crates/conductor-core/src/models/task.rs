//! Task model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::TaskStatus;

/// Unique identifier for a task within a scheduler instance.
pub type TaskId = u64;

/// Failure details attached to a task that could not be executed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskError {
    /// Human-readable failure message
    pub message: String,

    /// Optional extended detail (stack trace, executor diagnostics)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// When the failure was recorded (UTC)
    pub occurred_at: Timestamp,
}

/// Represents one unit of work in a plan's task tree.
///
/// Tasks live in the plan's flat arena and reference each other by id:
/// `parent`/`subtasks` express the tree, `depends_on` expresses explicit
/// cross-branch ordering constraints. A task with subtasks is *critical* —
/// its failure aborts the whole plan, because downstream consumers depend
/// on its children being consistent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier, assigned at creation, immutable
    pub id: TaskId,

    /// Human-readable goal of this task
    pub description: String,

    /// Current lifecycle state
    #[serde(default)]
    pub status: TaskStatus,

    /// Label of the external executor that should perform this task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_agent: Option<String>,

    /// Whether this task is delegated sub-work rather than top-level work
    #[serde(default)]
    pub is_subagent_task: bool,

    /// Parent task id; `None` for plan-root tasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<TaskId>,

    /// Child task ids in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<TaskId>,

    /// Tree depth, 0 at plan root
    pub depth: u32,

    /// Ids of tasks that must complete before this one may start
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<TaskId>,

    /// Unmet dependency ids recorded when the task is marked blocked
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_by: Vec<TaskId>,

    /// Completion percentage, 0.0 to 100.0, non-decreasing while running
    pub progress: f64,

    /// Duration estimate in minutes, used for plan-level estimates
    pub estimated_minutes: f64,

    /// Measured duration in minutes, set on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_minutes: Option<f64>,

    /// When execution of this task (or its first subtask) began
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,

    /// When this task reached a terminal state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,

    /// Failure details, populated only when `status` is `failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskError>,

    /// Output artifacts reported by the executor on success
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
}

impl Task {
    /// Whether this task's failure aborts the whole plan.
    pub fn is_critical(&self) -> bool {
        !self.subtasks.is_empty()
    }
}
