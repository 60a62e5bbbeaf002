//! Plan summary types and functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Plan, PlanId, PlanStatus, TaskStatus};

/// Summary information about a plan with task statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Plan ID
    pub id: PlanId,
    /// Owner label
    pub agent: String,
    /// High-level goal description
    pub root_task: String,
    /// Plan status
    pub status: PlanStatus,
    /// Total number of tasks in the tree
    pub total_tasks: u32,
    /// Number of completed tasks
    pub completed_tasks: u32,
    /// Number of failed tasks
    pub failed_tasks: u32,
    /// Number of blocked tasks
    pub blocked_tasks: u32,
    /// Creation timestamp
    pub created_at: Timestamp,
}

impl From<&Plan> for PlanSummary {
    fn from(plan: &Plan) -> Self {
        let mut completed = 0;
        let mut failed = 0;
        let mut blocked = 0;
        for task in plan.tasks.iter() {
            match task.status {
                TaskStatus::Completed => completed += 1,
                TaskStatus::Failed => failed += 1,
                TaskStatus::Blocked => blocked += 1,
                _ => {}
            }
        }

        Self {
            id: plan.id,
            agent: plan.agent.clone(),
            root_task: plan.root_task.clone(),
            status: plan.status,
            total_tasks: plan.tasks.len() as u32,
            completed_tasks: completed,
            failed_tasks: failed,
            blocked_tasks: blocked,
            created_at: plan.created_at,
        }
    }
}
