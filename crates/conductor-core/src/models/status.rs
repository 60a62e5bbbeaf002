//! Status enumerations for plans and tasks.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type-safe enumeration of plan lifecycle states.
///
/// The state machine is:
///
/// ```text
/// planning -> approval_requested -> approved -> executing -> completed
///                    |                                    \-> failed
///                    \-> rejected
/// ```
///
/// `rejected`, `completed` and `failed` are terminal; a plan in a terminal
/// state is moved into the bounded history buffer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Plan is being assembled and has not entered the approval workflow
    #[default]
    Planning,

    /// Plan is waiting for an approval decision
    ApprovalRequested,

    /// Plan is approved and may be executed
    Approved,

    /// Plan was rejected during approval; terminal
    Rejected,

    /// Plan is currently being executed
    Executing,

    /// Every task ran without failure; terminal
    Completed,

    /// At least one task failed or the run was aborted; terminal
    Failed,
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planning" => Ok(PlanStatus::Planning),
            "approval_requested" => Ok(PlanStatus::ApprovalRequested),
            "approved" => Ok(PlanStatus::Approved),
            "rejected" => Ok(PlanStatus::Rejected),
            "executing" => Ok(PlanStatus::Executing),
            "completed" => Ok(PlanStatus::Completed),
            "failed" => Ok(PlanStatus::Failed),
            _ => Err(format!("Invalid plan status: {s}")),
        }
    }
}

impl PlanStatus {
    /// Convert to the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Planning => "planning",
            PlanStatus::ApprovalRequested => "approval_requested",
            PlanStatus::Approved => "approved",
            PlanStatus::Rejected => "rejected",
            PlanStatus::Executing => "executing",
            PlanStatus::Completed => "completed",
            PlanStatus::Failed => "failed",
        }
    }

    /// Whether this state ends the plan lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PlanStatus::Rejected | PlanStatus::Completed | PlanStatus::Failed
        )
    }
}

/// Type-safe enumeration of task states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has not started
    #[default]
    Pending,

    /// Task (or one of its subtasks) is being worked on
    InProgress,

    /// Task finished successfully
    Completed,

    /// Task execution failed
    Failed,

    /// Task was skipped because a dependency never completed
    Blocked,
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "inprogress" | "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            "blocked" => Ok(TaskStatus::Blocked),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

impl TaskStatus {
    /// Convert to the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Blocked => "blocked",
        }
    }

    /// Single-character marker used by the tree visualization.
    ///
    /// Every status maps to a distinct glyph so a rendered tree can be
    /// scanned without reading the status words:
    ///
    /// - `○` pending
    /// - `➤` in progress
    /// - `✓` completed
    /// - `✗` failed
    /// - `⊘` blocked
    pub fn glyph(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "○",
            TaskStatus::InProgress => "➤",
            TaskStatus::Completed => "✓",
            TaskStatus::Failed => "✗",
            TaskStatus::Blocked => "⊘",
        }
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conductor_core::models::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::Completed.with_icon(), "✓ completed");
    /// assert_eq!(TaskStatus::Blocked.with_icon(), "⊘ blocked");
    /// ```
    pub fn with_icon(&self) -> String {
        format!("{} {}", self.glyph(), self.as_str())
    }
}
