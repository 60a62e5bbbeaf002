//! Plan-level progress and remaining-time estimation.
//!
//! Both estimates are pure functions over a plan snapshot, so they can be
//! queried at any point of the lifecycle without touching scheduler state.

use crate::clock::Clock;
use crate::models::{Plan, PlanStatus};

/// Computes overall completion of a plan as the arithmetic mean of task
/// progress across the entire flattened tree.
///
/// Every task weighs the same regardless of subtree size. Returns 0.0 for
/// an empty tree.
///
/// # Examples
///
/// ```rust
/// use conductor_core::progress::plan_progress;
/// # use conductor_core::models::{Plan, PlanStatus, TaskArena};
/// # use jiff::Timestamp;
/// # let plan = Plan {
/// #     id: 1,
/// #     agent: "orchestrator".to_string(),
/// #     root_task: "Ship it".to_string(),
/// #     status: PlanStatus::Planning,
/// #     tasks: TaskArena::new(),
/// #     dependencies: vec![],
/// #     estimated_minutes: 10.0,
/// #     actual_minutes: None,
/// #     estimated_cost: 1000.0,
/// #     actual_cost: None,
/// #     involved_agents: vec![],
/// #     subagent_count: 0,
/// #     created_at: Timestamp::UNIX_EPOCH,
/// #     approved_at: None,
/// #     started_at: None,
/// #     completed_at: None,
/// #     rejection_reason: None,
/// # };
/// assert_eq!(plan_progress(&plan), 0.0);
/// ```
pub fn plan_progress(plan: &Plan) -> f64 {
    let order = plan.tasks.flatten();
    if order.is_empty() {
        return 0.0;
    }
    let total: f64 = order
        .iter()
        .filter_map(|&id| plan.tasks.get(id))
        .map(|task| task.progress)
        .sum();
    total / order.len() as f64
}

/// Projects the remaining execution time of a plan, in minutes.
///
/// Outside of execution the static estimate is returned unchanged. During
/// execution with no measurable progress there is nothing to extrapolate
/// from, so the static estimate is returned as well. Otherwise the total
/// duration is extrapolated linearly from elapsed time and current
/// progress: `total = elapsed / (progress / 100)`, and the remainder is
/// clamped at zero.
pub fn time_remaining(plan: &Plan, clock: &dyn Clock) -> f64 {
    if plan.status != PlanStatus::Executing {
        return plan.estimated_minutes;
    }
    let Some(started_at) = plan.started_at else {
        return plan.estimated_minutes;
    };
    let progress = plan_progress(plan);
    if progress <= 0.0 {
        return plan.estimated_minutes;
    }

    let elapsed = clock.now().duration_since(started_at).as_secs_f64() / 60.0;
    let total = elapsed / (progress / 100.0);
    (total - elapsed).max(0.0)
}
