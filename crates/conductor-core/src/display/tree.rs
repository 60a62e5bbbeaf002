//! ASCII rendering of a plan's task tree and dependency graph.

use std::fmt;

use super::datetime::Minutes;
use crate::models::{Plan, TaskStatus};

/// Inner width of the header box, in characters.
const BOX_WIDTH: usize = 58;

/// Newtype wrapper rendering a plan as human-readable text.
///
/// The rendering is a fixed-width box with the plan's identity and
/// estimates, followed by the indented task tree (one distinct status
/// glyph per state) and the dependency list as `<kind>: <description>`
/// lines. Rendering never mutates the plan; the same plan renders to the
/// same text every time.
///
/// # Examples
///
/// ```rust,no_run
/// use conductor_core::{display::PlanVisualization, params::Id, SchedulerBuilder};
///
/// # async fn example() -> conductor_core::Result<()> {
/// let scheduler = SchedulerBuilder::new().build()?;
/// # let id = Id { id: 1 };
/// let plan = scheduler.get_plan(&id).await?.expect("plan exists");
/// println!("{}", PlanVisualization(&plan));
/// # Ok(())
/// # }
/// ```
pub struct PlanVisualization<'a>(pub &'a Plan);

fn box_rule(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "+{}+", "-".repeat(BOX_WIDTH))
}

fn box_line(f: &mut fmt::Formatter<'_>, content: &str) -> fmt::Result {
    let truncated: String = content.chars().take(BOX_WIDTH - 2).collect();
    writeln!(f, "| {:<width$} |", truncated, width = BOX_WIDTH - 2)
}

impl fmt::Display for PlanVisualization<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.0;

        box_rule(f)?;
        box_line(f, &format!("Plan #{}  agent: {}", plan.id, plan.agent))?;
        box_line(f, &plan.root_task)?;
        box_line(f, &format!("status: {}", plan.status))?;
        box_line(
            f,
            &format!(
                "estimated: {}  cost: {:.0} units",
                Minutes(plan.estimated_minutes),
                plan.estimated_cost
            ),
        )?;
        box_rule(f)?;

        writeln!(f, "Tasks:")?;
        if plan.tasks.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for task in plan.tasks.iter() {
            let indent = "  ".repeat(task.depth as usize + 1);
            write!(f, "{indent}{} [{}] {}", task.status.glyph(), task.id, task.description)?;
            if task.status == TaskStatus::InProgress {
                write!(f, " ({:.0}%)", task.progress)?;
            }
            if let Some(agent) = &task.assigned_agent {
                write!(f, " @{agent}")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Dependencies:")?;
        if plan.dependencies.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for edge in &plan.dependencies {
            writeln!(f, "  {edge}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::{
        DependencyEdge, DependencyKind, PlanStatus, Task, TaskArena,
    };

    fn sample_plan() -> Plan {
        let mut tasks = TaskArena::new();
        tasks.insert(Task {
            id: 1,
            description: "Deploy service".to_string(),
            status: TaskStatus::Pending,
            assigned_agent: None,
            is_subagent_task: false,
            parent: None,
            subtasks: Vec::new(),
            depth: 0,
            depends_on: Vec::new(),
            blocked_by: Vec::new(),
            progress: 0.0,
            estimated_minutes: 5.0,
            actual_minutes: None,
            started_at: None,
            completed_at: None,
            error: None,
            outputs: Vec::new(),
        });
        tasks.insert(Task {
            id: 2,
            description: "Build".to_string(),
            status: TaskStatus::Completed,
            assigned_agent: Some("builder".to_string()),
            is_subagent_task: true,
            parent: Some(1),
            subtasks: Vec::new(),
            depth: 1,
            depends_on: Vec::new(),
            blocked_by: Vec::new(),
            progress: 100.0,
            estimated_minutes: 5.0,
            actual_minutes: None,
            started_at: None,
            completed_at: None,
            error: None,
            outputs: Vec::new(),
        });

        Plan {
            id: 3,
            agent: "orchestrator".to_string(),
            root_task: "Deploy service".to_string(),
            status: PlanStatus::ApprovalRequested,
            tasks,
            dependencies: vec![DependencyEdge {
                from: 1,
                to: 2,
                kind: DependencyKind::Enables,
                description: "Deploy service --> Build".to_string(),
            }],
            estimated_minutes: 10.0,
            actual_minutes: None,
            estimated_cost: 2000.0,
            actual_cost: None,
            involved_agents: vec!["builder".to_string()],
            subagent_count: 1,
            created_at: Timestamp::UNIX_EPOCH,
            approved_at: None,
            started_at: None,
            completed_at: None,
            rejection_reason: None,
        }
    }

    #[test]
    fn renders_box_tree_and_dependencies() {
        let plan = sample_plan();
        let text = PlanVisualization(&plan).to_string();

        assert!(text.contains("Plan #3  agent: orchestrator"));
        assert!(text.contains("estimated: 10 min"));
        assert!(text.contains("cost: 2000 units"));
        assert!(text.contains("  ○ [1] Deploy service"));
        assert!(text.contains("    ✓ [2] Build @builder"));
        assert!(text.contains("enables: Deploy service --> Build"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let plan = sample_plan();
        let first = PlanVisualization(&plan).to_string();
        let second = PlanVisualization(&plan).to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn distinct_glyph_per_status() {
        let glyphs = [
            TaskStatus::Pending.glyph(),
            TaskStatus::InProgress.glyph(),
            TaskStatus::Completed.glyph(),
            TaskStatus::Failed.glyph(),
            TaskStatus::Blocked.glyph(),
        ];
        for (i, a) in glyphs.iter().enumerate() {
            for b in &glyphs[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
