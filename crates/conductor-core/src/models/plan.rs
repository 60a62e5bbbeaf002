//! Plan model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{DependencyEdge, PlanStatus, TaskArena};

/// Unique identifier for a plan within a scheduler instance.
pub type PlanId = u64;

/// The root aggregate: one planned unit of work and its full task tree.
///
/// A plan exclusively owns its tasks; tasks never outlive their plan. Once
/// a plan reaches a terminal state it is archived into the bounded history
/// buffer and becomes read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Unique identifier for the plan
    pub id: PlanId,

    /// Owner label (which agent requested this plan)
    pub agent: String,

    /// High-level description of the overall goal (not itself a task)
    pub root_task: String,

    /// Current lifecycle state
    #[serde(default)]
    pub status: PlanStatus,

    /// The task tree, stored flat and indexed by id
    pub tasks: TaskArena,

    /// Derived dependency graph, cached at creation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyEdge>,

    /// Duration estimate in minutes
    pub estimated_minutes: f64,

    /// Measured duration in minutes, set when the plan terminates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_minutes: Option<f64>,

    /// Cost estimate in abstract units (e.g. token count)
    pub estimated_cost: f64,

    /// Measured cost, set when the plan terminates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_cost: Option<f64>,

    /// Deduplicated `assigned_agent` values found in the tree, first-seen
    /// order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub involved_agents: Vec<String>,

    /// Number of tasks flagged as subagent work
    pub subagent_count: u32,

    /// Timestamp when the plan was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the plan was approved; set at most once
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<Timestamp>,

    /// Timestamp when execution began; set at most once
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,

    /// Timestamp when the plan reached a terminal state; set at most once
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,

    /// Reason given when the plan was rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}
