//! Display implementations for domain models.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{DependencyEdge, DependencyKind, PlanStatus, PlanSummary, TaskStatus};

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.description)
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## {} (ID: {}) [{}] ({}/{})",
            self.root_task, self.id, self.status, self.completed_tasks, self.total_tasks
        )?;
        writeln!(f)?;
        writeln!(f, "- **Agent**: {}", self.agent)?;
        if self.failed_tasks > 0 {
            writeln!(f, "- **Failed**: {}", self.failed_tasks)?;
        }
        if self.blocked_tasks > 0 {
            writeln!(f, "- **Blocked**: {}", self.blocked_tasks)?;
        }
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)
    }
}
