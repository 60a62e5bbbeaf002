//! Dependency edge types derived from a plan's task tree.

use serde::{Deserialize, Serialize};

use super::TaskId;

/// Kind of a dependency edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Implicit parent-to-child edge: the parent logically precedes the
    /// child it contains
    Enables,

    /// Explicit `depends_on` edge: the source must complete before the
    /// target may start
    Blocks,
}

impl DependencyKind {
    /// Convert to the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::Enables => "enables",
            DependencyKind::Blocks => "blocks",
        }
    }
}

/// One edge of the flat dependency graph derived from a task tree.
///
/// The edge list is a cache on the plan, recomputed when the tree changes
/// materially; it feeds the execution queue and the visualizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DependencyEdge {
    /// Source task (the prerequisite)
    pub from: TaskId,

    /// Target task (the dependent)
    pub to: TaskId,

    /// Whether the edge is implicit (enables) or explicit (blocks)
    pub kind: DependencyKind,

    /// Human-readable rendering of the edge, mermaid-style
    pub description: String,
}
