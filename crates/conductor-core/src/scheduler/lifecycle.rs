//! Plan lifecycle operations: creation, approval workflow, archival and
//! read-only queries.

use std::collections::HashMap;

use super::Scheduler;
use crate::display::PlanVisualization;
use crate::error::{Result, SchedulerError};
use crate::events::SchedulerEventKind;
use crate::graph;
use crate::models::{
    Plan, PlanStatus, PlanSummary, Task, TaskArena, TaskId, TaskStatus,
};
use crate::params::{CreatePlan, Id, RejectPlan, TaskSpec};
use crate::progress;

/// Standard decomposition used when a plan is created without tasks.
///
/// Stands in for the agent-driven breakdown that lives outside this
/// component: one root task carrying the overall goal, split into a
/// research, an implementation and a verification phase.
fn default_breakdown(root_task: &str) -> Vec<TaskSpec> {
    vec![TaskSpec {
        description: root_task.to_string(),
        subtasks: vec![
            TaskSpec::new(format!("Research: {root_task}")),
            TaskSpec::new(format!("Implement: {root_task}")),
            TaskSpec::new(format!("Verify: {root_task}")),
        ],
        ..TaskSpec::default()
    }]
}

impl Scheduler {
    /// Creates a new plan and inserts it into the live map.
    ///
    /// The task tree is built from the supplied specs, or from the
    /// breakdown placeholder when none are given. Dependency labels are
    /// resolved and validated, the dependency graph is derived and
    /// checked for cycles, and estimates are computed where the caller
    /// did not supply them. Depending on configuration the plan is either
    /// auto-approved or parked in `approval_requested` with a
    /// `plan-approval-requested` event carrying the rendered tree.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidInput` for an empty agent or goal,
    /// an empty task description, a duplicate or unknown dependency
    /// label; `SchedulerError::CyclicDependency` when the declared
    /// dependencies form a cycle.
    pub async fn create_plan(&self, params: &CreatePlan) -> Result<Plan> {
        if params.agent.trim().is_empty() {
            return Err(SchedulerError::invalid_input(
                "agent",
                "an owner label is required",
            ));
        }
        if params.root_task.trim().is_empty() {
            return Err(SchedulerError::invalid_input(
                "root_task",
                "a goal description is required",
            ));
        }

        let specs = if params.tasks.is_empty() {
            default_breakdown(&params.root_task)
        } else {
            params.tasks.clone()
        };

        let mut arena = TaskArena::new();
        let mut labels = HashMap::new();
        let mut declared = Vec::new();
        self.build_tasks(&specs, None, 0, &mut arena, &mut labels, &mut declared)?;
        resolve_dependencies(&mut arena, &labels, &declared)?;

        let dependencies = graph::analyze(&arena);
        // Fails fast on cyclic `depends_on` declarations.
        graph::execution_order(&arena)?;

        let estimated_minutes = params.estimated_minutes.unwrap_or_else(|| {
            arena.iter().map(|task| task.estimated_minutes).sum()
        });
        let estimated_cost = params
            .estimated_cost
            .unwrap_or_else(|| arena.len() as f64 * self.config.cost_per_task);

        let mut involved_agents: Vec<String> = Vec::new();
        let mut subagent_count = 0;
        for task in arena.iter() {
            if let Some(agent) = &task.assigned_agent {
                if !involved_agents.contains(agent) {
                    involved_agents.push(agent.clone());
                }
            }
            if task.is_subagent_task {
                subagent_count += 1;
            }
        }

        let auto_approve = params.auto_approve.unwrap_or(self.config.auto_approve);
        let now = self.clock.now();
        let plan = Plan {
            id: self.next_id(),
            agent: params.agent.clone(),
            root_task: params.root_task.clone(),
            status: if auto_approve {
                PlanStatus::Approved
            } else {
                PlanStatus::ApprovalRequested
            },
            tasks: arena,
            dependencies,
            estimated_minutes,
            actual_minutes: None,
            estimated_cost,
            actual_cost: None,
            involved_agents,
            subagent_count,
            created_at: now,
            approved_at: auto_approve.then_some(now),
            started_at: None,
            completed_at: None,
            rejection_reason: None,
        };

        let visualization =
            (!auto_approve).then(|| PlanVisualization(&plan).to_string());
        let plan_id = plan.id;
        let snapshot = plan.clone();
        self.state().live.insert(plan_id, plan);

        log::info!(
            "created plan {plan_id} for agent '{}' with {} task(s)",
            params.agent,
            snapshot.tasks.len()
        );
        self.emit(plan_id, SchedulerEventKind::PlanCreated);
        match visualization {
            None => self.emit(plan_id, SchedulerEventKind::PlanApproved),
            Some(visualization) => self.emit(
                plan_id,
                SchedulerEventKind::PlanApprovalRequested { visualization },
            ),
        }

        Ok(snapshot)
    }

    fn build_tasks(
        &self,
        specs: &[TaskSpec],
        parent: Option<TaskId>,
        depth: u32,
        arena: &mut TaskArena,
        labels: &mut HashMap<String, TaskId>,
        declared: &mut Vec<(TaskId, Vec<String>)>,
    ) -> Result<()> {
        for spec in specs {
            if spec.description.trim().is_empty() {
                return Err(SchedulerError::invalid_input(
                    "description",
                    "every task needs a description",
                ));
            }
            let id = self.next_id();
            if let Some(label) = &spec.label {
                if labels.insert(label.clone(), id).is_some() {
                    return Err(SchedulerError::invalid_input(
                        "label",
                        format!("duplicate task label '{label}'"),
                    ));
                }
            }
            arena.insert(Task {
                id,
                description: spec.description.clone(),
                status: TaskStatus::Pending,
                assigned_agent: spec.assigned_agent.clone(),
                is_subagent_task: spec.is_subagent_task,
                parent,
                subtasks: Vec::new(),
                depth,
                depends_on: Vec::new(),
                blocked_by: Vec::new(),
                progress: 0.0,
                estimated_minutes: spec
                    .estimated_minutes
                    .unwrap_or(self.config.default_task_minutes),
                actual_minutes: None,
                started_at: None,
                completed_at: None,
                error: None,
                outputs: Vec::new(),
            });
            declared.push((id, spec.depends_on.clone()));
            self.build_tasks(&spec.subtasks, Some(id), depth + 1, arena, labels, declared)?;
        }
        Ok(())
    }

    /// Approves a plan that is awaiting approval.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::PlanNotFound` for an unknown id and
    /// `SchedulerError::InvalidInput` when the plan is not awaiting
    /// approval.
    pub async fn approve_plan(&self, params: &Id) -> Result<Plan> {
        let snapshot = {
            let mut state = self.state();
            let plan = state
                .live
                .get_mut(&params.id)
                .ok_or(SchedulerError::PlanNotFound { id: params.id })?;
            match plan.status {
                PlanStatus::ApprovalRequested | PlanStatus::Planning => {}
                other => {
                    return Err(SchedulerError::invalid_input(
                        "status",
                        format!("plan {} cannot be approved from status '{other}'", params.id),
                    ))
                }
            }
            plan.status = PlanStatus::Approved;
            plan.approved_at = Some(self.clock.now());
            plan.clone()
        };

        log::info!("plan {} approved", params.id);
        self.emit(params.id, SchedulerEventKind::PlanApproved);
        Ok(snapshot)
    }

    /// Rejects a plan that is awaiting approval and archives it.
    ///
    /// The reason is stored on the plan and carried in the rejection
    /// notification.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::PlanNotFound` for an unknown id and
    /// `SchedulerError::InvalidInput` when the plan is not awaiting
    /// approval.
    pub async fn reject_plan(&self, params: &RejectPlan) -> Result<Plan> {
        let snapshot = {
            let mut state = self.state();
            let status = state
                .live
                .get(&params.id)
                .ok_or(SchedulerError::PlanNotFound { id: params.id })?
                .status;
            match status {
                PlanStatus::ApprovalRequested | PlanStatus::Planning => {}
                other => {
                    return Err(SchedulerError::invalid_input(
                        "status",
                        format!("plan {} cannot be rejected from status '{other}'", params.id),
                    ))
                }
            }
            let Some(mut plan) = state.live.remove(&params.id) else {
                return Err(SchedulerError::PlanNotFound { id: params.id });
            };
            plan.status = PlanStatus::Rejected;
            plan.rejection_reason = Some(params.reason.clone());
            let snapshot = plan.clone();
            Self::archive(&mut state, plan, self.config.history_capacity);
            snapshot
        };

        log::info!("plan {} rejected: {}", params.id, params.reason);
        self.emit(
            params.id,
            SchedulerEventKind::PlanRejected {
                reason: params.reason.clone(),
            },
        );
        Ok(snapshot)
    }

    /// Returns the current status of a plan, live or archived.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::PlanNotFound` for an unknown id.
    pub async fn plan_status(&self, params: &Id) -> Result<PlanStatus> {
        self.get_plan(params)
            .await?
            .map(|plan| plan.status)
            .ok_or(SchedulerError::PlanNotFound { id: params.id })
    }

    /// Retrieves a plan by id, searching live plans then history.
    pub async fn get_plan(&self, params: &Id) -> Result<Option<Plan>> {
        let state = self.state();
        if let Some(plan) = state.live.get(&params.id) {
            return Ok(Some(plan.clone()));
        }
        Ok(state
            .history
            .iter()
            .find(|plan| plan.id == params.id)
            .cloned())
    }

    /// Summaries of every live (non-archived) plan, oldest first.
    pub async fn live_plans(&self) -> Vec<PlanSummary> {
        let state = self.state();
        let mut summaries: Vec<PlanSummary> =
            state.live.values().map(PlanSummary::from).collect();
        summaries.sort_by_key(|summary| summary.id);
        summaries
    }

    /// Summaries of archived plans, most recent first.
    pub async fn history(&self) -> Vec<PlanSummary> {
        let state = self.state();
        state.history.iter().map(PlanSummary::from).collect()
    }

    /// Renders the plan's tree and dependency list as text.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::PlanNotFound` for an unknown id.
    pub async fn visualize(&self, params: &Id) -> Result<String> {
        let plan = self
            .get_plan(params)
            .await?
            .ok_or(SchedulerError::PlanNotFound { id: params.id })?;
        Ok(PlanVisualization(&plan).to_string())
    }

    /// Overall completion of a plan, 0.0 to 100.0.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::PlanNotFound` for an unknown id.
    pub async fn plan_progress(&self, params: &Id) -> Result<f64> {
        let plan = self
            .get_plan(params)
            .await?
            .ok_or(SchedulerError::PlanNotFound { id: params.id })?;
        Ok(progress::plan_progress(&plan))
    }

    /// Projected remaining execution time of a plan, in minutes.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::PlanNotFound` for an unknown id.
    pub async fn time_remaining(&self, params: &Id) -> Result<f64> {
        let plan = self
            .get_plan(params)
            .await?
            .ok_or(SchedulerError::PlanNotFound { id: params.id })?;
        Ok(progress::time_remaining(&plan, self.clock.as_ref()))
    }
}

fn resolve_dependencies(
    arena: &mut TaskArena,
    labels: &HashMap<String, TaskId>,
    declared: &[(TaskId, Vec<String>)],
) -> Result<()> {
    for (id, dep_labels) in declared {
        let mut deps: Vec<TaskId> = Vec::with_capacity(dep_labels.len());
        for label in dep_labels {
            let Some(&dep_id) = labels.get(label) else {
                return Err(SchedulerError::invalid_input(
                    "depends_on",
                    format!("unknown task label '{label}'"),
                ));
            };
            if !deps.contains(&dep_id) {
                deps.push(dep_id);
            }
        }
        if let Some(task) = arena.get_mut(*id) {
            task.depends_on = deps;
        }
    }
    Ok(())
}
