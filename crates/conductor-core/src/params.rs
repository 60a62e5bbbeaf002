//! Parameter structures for scheduler operations.
//!
//! This module contains shared parameter structures that can be used across
//! different interfaces without framework-specific derives or dependencies.
//! Interface layers (an MCP server, a future REST API) wrap these structs
//! and add their own derives; the core stays free of UI concerns.
//!
//! Task trees are described with [`TaskSpec`] values. Because task ids are
//! handed out by the scheduler at creation, a spec cannot reference another
//! task by id; instead a spec may carry a `label`, and `depends_on` entries
//! name the labels of other specs in the same plan. Labels resolve to ids
//! during creation; an unknown label is an input error.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Generic parameters for operations requiring just a plan ID.
///
/// Used for operations like `approve_plan`, `execute_plan`, `get_plan`,
/// `plan_status` and `visualize`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Id {
    /// The ID of the plan to operate on
    pub id: u64,
}

/// Declarative description of one task in a plan under construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct TaskSpec {
    /// Human-readable goal of the task (required)
    pub description: String,

    /// Optional label other specs may reference in `depends_on`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Label of the external executor that should perform this task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agent: Option<String>,

    /// Whether this task is delegated sub-work
    #[serde(default)]
    pub is_subagent_task: bool,

    /// Per-task duration estimate in minutes; the configured default is
    /// used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<f64>,

    /// Labels of tasks that must complete before this one may start
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Child task specs, in execution declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<TaskSpec>,
}

impl TaskSpec {
    /// Creates a spec with just a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}

/// Parameters for creating a new plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreatePlan {
    /// Owner label for the plan (required)
    pub agent: String,

    /// High-level description of the overall goal (required)
    pub root_task: String,

    /// Root task specs; when empty, the breakdown placeholder generates a
    /// standard decomposition of `root_task`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<TaskSpec>,

    /// Plan-level duration estimate in minutes; computed from the tasks
    /// when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<f64>,

    /// Plan-level cost estimate in abstract units; computed from the task
    /// count when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,

    /// Overrides the scheduler's auto-approve setting for this plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_approve: Option<bool>,
}

/// Parameters for rejecting a plan that is awaiting approval.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RejectPlan {
    /// The ID of the plan to reject
    pub id: u64,

    /// Why the plan was rejected; carried in the rejection notification
    pub reason: String,
}
