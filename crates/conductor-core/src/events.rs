//! Scheduler event types for external consumers.
//!
//! Dashboards and learning pipelines observe the scheduler through a
//! broadcast topic obtained from [`Scheduler::subscribe`]. Every event
//! carries the plan it concerns and a clock timestamp; the kind enum
//! serializes with a kebab-case `event` tag so downstream consumers see
//! stable names like `plan-created` and `task-blocked`.
//!
//! [`Scheduler::subscribe`]: crate::Scheduler::subscribe

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{PlanId, TaskId};

/// A single notification emitted by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerEvent {
    /// When the event was emitted (scheduler clock, UTC)
    pub timestamp: Timestamp,

    /// The plan this event concerns
    pub plan_id: PlanId,

    /// What happened
    #[serde(flatten)]
    pub kind: SchedulerEventKind,
}

/// Specific event types emitted over the scheduler's broadcast topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum SchedulerEventKind {
    /// A plan was created and inserted into the live map
    PlanCreated,
    /// A plan is waiting for approval; carries the rendered tree so an
    /// approver can inspect it without another query
    PlanApprovalRequested { visualization: String },
    /// A plan was approved for execution
    PlanApproved,
    /// A plan was rejected and archived
    PlanRejected { reason: String },
    /// Plan execution began
    PlanStarted,
    /// Every executed task succeeded
    PlanCompleted,
    /// The plan terminated with a failure
    PlanFailed { error: String },
    /// A task (or its first subtask) began executing
    TaskStarted { task_id: TaskId },
    /// The executor reported progress on a running task
    TaskProgress { task_id: TaskId, progress: f64 },
    /// A task finished successfully
    TaskCompleted { task_id: TaskId },
    /// A task failed
    TaskFailed { task_id: TaskId, error: String },
    /// A task was skipped because its dependencies never completed
    TaskBlocked { task_id: TaskId, blocked_by: Vec<TaskId> },
}

impl SchedulerEvent {
    /// Creates an event stamped with the given instant.
    pub fn new(timestamp: Timestamp, plan_id: PlanId, kind: SchedulerEventKind) -> Self {
        Self {
            timestamp,
            plan_id,
            kind,
        }
    }

    /// Serializes to a single JSON line for log-pipeline consumers.
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
