//! Error types for the scheduler library.

use thiserror::Error;

use crate::models::{PlanId, PlanStatus, TaskId};

/// Comprehensive error type for all scheduler operations.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Plan not found for the given ID
    #[error("Plan with ID {id} not found")]
    PlanNotFound { id: PlanId },
    /// Plan is not in the `approved` state required for execution
    #[error("Plan {id} is not approved for execution (status: {status})")]
    PlanNotApproved { id: PlanId, status: PlanStatus },
    /// The dependency graph contains a cycle
    #[error("Cyclic dependency detected at task {task_id}")]
    CyclicDependency { task_id: TaskId },
    /// A task failed while being executed by the external executor
    #[error("Execution of task {task_id} failed: {message}")]
    TaskExecution { task_id: TaskId, message: String },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl SchedulerError {
    /// Creates an input validation error for a named field.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SchedulerError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a task execution error from any displayable failure.
    pub fn task_execution(task_id: TaskId, message: impl Into<String>) -> Self {
        SchedulerError::TaskExecution {
            task_id,
            message: message.into(),
        }
    }
}

/// Result type alias for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;
