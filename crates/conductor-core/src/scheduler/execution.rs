//! Ready-set execution of approved plans.
//!
//! Execution walks the topologically ordered queue, dispatching every
//! task whose prerequisites are met onto a bounded worker pool and
//! re-evaluating readiness after each completion. A task's *own work* is
//! ready once all of its explicit dependencies and all of its subtasks
//! have completed, which preserves the depth-first contract: subtasks
//! finish before their parent does, and a parent is `in_progress` from
//! the moment its first descendant starts.
//!
//! Failure policy: a root-level leaf failure is recorded and the run
//! continues; a subtask failure renders its parent unable to complete and
//! aborts the run, as does the failure of any task that has subtasks.
//! Tasks whose dependencies never complete are marked blocked when the
//! run stalls; they are skipped, not failed.

use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::Scheduler;
use crate::error::{Result, SchedulerError};
use crate::events::SchedulerEventKind;
use crate::executor::{ProgressReporter, ProgressUpdate, TaskDescriptor, TaskOutcome};
use crate::graph;
use crate::models::{PlanId, PlanStatus, TaskError, TaskId, TaskStatus};
use crate::params::Id;

/// Aggregate outcome of one `execute_plan` call.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    /// The executed plan
    pub plan_id: PlanId,

    /// Whether every executed task succeeded
    pub success: bool,

    /// Ids of completed tasks, in queue order
    pub completed: Vec<TaskId>,

    /// Ids of failed tasks, in queue order
    pub failed: Vec<TaskId>,

    /// Ids of tasks skipped over unmet dependencies, in queue order
    pub blocked: Vec<TaskId>,

    /// Wall-clock duration of the run, in minutes
    pub duration_minutes: f64,

    /// Measured cost of the run, in abstract units
    pub cost: f64,

    /// Output artifacts of all completed tasks, in completion order
    pub outputs: Vec<String>,
}

/// What one worker hands back to the loop.
struct DispatchOutcome {
    task_id: TaskId,
    outcome: anyhow::Result<TaskOutcome>,
}

/// Local bookkeeping for a single execution pass.
///
/// The loop owns these sets exclusively; the shared plan state is only
/// touched in short lock sections to mirror transitions for observers.
struct RunState {
    queue: Vec<TaskId>,
    deps: HashMap<TaskId, Vec<TaskId>>,
    children: HashMap<TaskId, Vec<TaskId>>,
    parent: HashMap<TaskId, Option<TaskId>>,
    descriptors: HashMap<TaskId, TaskDescriptor>,
    dispatched: HashSet<TaskId>,
    running: HashSet<TaskId>,
    completed: HashSet<TaskId>,
    failed: HashSet<TaskId>,
    blocked: HashSet<TaskId>,
    outputs: Vec<String>,
}

impl RunState {
    fn is_ready(&self, id: TaskId) -> bool {
        !self.dispatched.contains(&id)
            && self.deps[&id].iter().all(|dep| self.completed.contains(dep))
            && self
                .children[&id]
                .iter()
                .all(|child| self.completed.contains(child))
    }

    fn unmet(&self, id: TaskId) -> Vec<TaskId> {
        self.deps[&id]
            .iter()
            .chain(self.children[&id].iter())
            .copied()
            .filter(|other| !self.completed.contains(other))
            .collect()
    }
}

impl Scheduler {
    /// Executes an approved plan to completion or failure.
    ///
    /// See [`Scheduler::execute_plan_with_token`]; this variant runs with
    /// a token nobody cancels.
    pub async fn execute_plan(&self, params: &Id) -> Result<ExecutionReport> {
        self.execute_plan_with_token(params, CancellationToken::new())
            .await
    }

    /// Executes an approved plan, honoring the given cancellation token.
    ///
    /// Cancelling the token aborts in-flight tasks, stops further
    /// dispatch and terminates the plan as `failed`. Whatever the
    /// outcome, the plan is archived before this returns.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::PlanNotFound` for an unknown id
    /// - `SchedulerError::PlanNotApproved` when the plan is not in the
    ///   `approved` state; the plan is left untouched
    /// - `SchedulerError::CyclicDependency` when the dependency graph is
    ///   cyclic
    /// - `SchedulerError::TaskExecution` when a critical task (or one of
    ///   its subtasks) fails; the plan is marked `failed` and archived
    ///   before the error is returned
    pub async fn execute_plan_with_token(
        &self,
        params: &Id,
        cancel: CancellationToken,
    ) -> Result<ExecutionReport> {
        let plan_id = params.id;
        let mut run = {
            let mut state = self.state();
            let plan = state
                .live
                .get_mut(&plan_id)
                .ok_or(SchedulerError::PlanNotFound { id: plan_id })?;
            if plan.status != PlanStatus::Approved {
                return Err(SchedulerError::PlanNotApproved {
                    id: plan_id,
                    status: plan.status,
                });
            }
            let queue = graph::execution_order(&plan.tasks)?;
            plan.status = PlanStatus::Executing;
            plan.started_at = Some(self.clock.now());

            let mut deps = HashMap::new();
            let mut children = HashMap::new();
            let mut parent = HashMap::new();
            let mut descriptors = HashMap::new();
            for task in plan.tasks.iter() {
                deps.insert(task.id, task.depends_on.clone());
                children.insert(task.id, task.subtasks.clone());
                parent.insert(task.id, task.parent);
                descriptors.insert(
                    task.id,
                    TaskDescriptor {
                        id: task.id,
                        description: task.description.clone(),
                        assigned_agent: task.assigned_agent.clone(),
                    },
                );
            }
            RunState {
                queue,
                deps,
                children,
                parent,
                descriptors,
                dispatched: HashSet::new(),
                running: HashSet::new(),
                completed: HashSet::new(),
                failed: HashSet::new(),
                blocked: HashSet::new(),
                outputs: Vec::new(),
            }
        };

        log::info!("executing plan {plan_id} ({} task(s))", run.queue.len());
        self.emit(plan_id, SchedulerEventKind::PlanStarted);

        let (abort, cancelled) = self.run_queue(plan_id, &mut run, &cancel).await;

        if abort.is_none() && !cancelled {
            self.mark_stalled_blocked(plan_id, &mut run);
        }

        let report = self.finalize(plan_id, &run, abort.as_ref(), cancelled)?;
        match abort {
            Some(err) => Err(err),
            None => Ok(report),
        }
    }

    /// Drives the worker pool until the queue is exhausted or the run is
    /// aborted. Returns the abort error (critical failure), if any, and
    /// whether the run was cancelled.
    async fn run_queue(
        &self,
        plan_id: PlanId,
        run: &mut RunState,
        cancel: &CancellationToken,
    ) -> (Option<SchedulerError>, bool) {
        let (tx, mut rx) = mpsc::unbounded_channel::<ProgressUpdate>();
        let mut join: JoinSet<DispatchOutcome> = JoinSet::new();
        let mut abort: Option<SchedulerError> = None;
        let mut cancelled = false;

        loop {
            if abort.is_none() && !cancelled {
                while run.running.len() < self.config.max_concurrent {
                    let Some(next) = run
                        .queue
                        .iter()
                        .copied()
                        .find(|&id| run.is_ready(id))
                    else {
                        break;
                    };
                    self.dispatch_task(plan_id, run, next, &tx, &mut join);
                }
            }

            if join.is_empty() {
                break;
            }

            tokio::select! {
                // Progress drains before completions so a report sent just
                // ahead of the terminal outcome is not observed after it.
                biased;

                Some(update) = rx.recv() => {
                    self.apply_progress(plan_id, update);
                }
                () = cancel.cancelled(), if !cancelled => {
                    log::warn!("execution of plan {plan_id} cancelled");
                    cancelled = true;
                    join.abort_all();
                }
                joined = join.join_next() => {
                    match joined {
                        Some(Ok(result)) => {
                            if let Some(err) = self.finish_task(plan_id, run, result) {
                                abort.get_or_insert(err);
                            }
                        }
                        Some(Err(join_err)) => {
                            if !join_err.is_cancelled() {
                                log::error!("worker terminated abnormally: {join_err}");
                            }
                        }
                        None => {}
                    }
                }
            }
        }

        // Progress that raced with the final completion.
        while let Ok(update) = rx.try_recv() {
            self.apply_progress(plan_id, update);
        }

        if cancelled {
            for id in run.running.clone() {
                self.fail_task(plan_id, run, id, "execution cancelled");
            }
            run.running.clear();
        }

        (abort, cancelled)
    }

    fn dispatch_task(
        &self,
        plan_id: PlanId,
        run: &mut RunState,
        id: TaskId,
        tx: &mpsc::UnboundedSender<ProgressUpdate>,
        join: &mut JoinSet<DispatchOutcome>,
    ) {
        run.dispatched.insert(id);
        run.running.insert(id);
        self.mark_started(plan_id, run, id);

        let descriptor = run.descriptors[&id].clone();
        let reporter = ProgressReporter::new(id, tx.clone());
        let executor = Arc::clone(&self.executor);
        let timeout = self.config.task_timeout;
        join.spawn(async move {
            let work = async move {
                match timeout {
                    Some(deadline) => {
                        match tokio::time::timeout(deadline, executor.execute(descriptor, reporter))
                            .await
                        {
                            Ok(result) => result,
                            Err(_) => Err(anyhow::anyhow!(
                                "task exceeded deadline of {deadline:?}"
                            )),
                        }
                    }
                    None => executor.execute(descriptor, reporter).await,
                }
            };
            let outcome = AssertUnwindSafe(work)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(anyhow::anyhow!("executor panicked")));
            DispatchOutcome {
                task_id: id,
                outcome,
            }
        });
    }

    /// Marks a task (and any still-pending ancestors) as started.
    ///
    /// A parent is considered started the moment its first descendant
    /// starts; events fire root-down so observers see a consistent tree.
    fn mark_started(&self, plan_id: PlanId, run: &RunState, id: TaskId) {
        let mut chain = vec![id];
        let mut cursor = id;
        while let Some(Some(parent_id)) = run.parent.get(&cursor) {
            chain.push(*parent_id);
            cursor = *parent_id;
        }

        let now = self.clock.now();
        let mut newly_started = Vec::new();
        {
            let mut state = self.state();
            let Some(plan) = state.live.get_mut(&plan_id) else {
                return;
            };
            for &task_id in chain.iter().rev() {
                if let Some(task) = plan.tasks.get_mut(task_id) {
                    if task.status == TaskStatus::Pending {
                        task.status = TaskStatus::InProgress;
                        task.started_at = Some(now);
                        newly_started.push(task_id);
                    }
                }
            }
        }
        for task_id in newly_started {
            self.emit(plan_id, SchedulerEventKind::TaskStarted { task_id });
        }
    }

    fn apply_progress(&self, plan_id: PlanId, update: ProgressUpdate) {
        let mut advanced = false;
        {
            let mut state = self.state();
            if let Some(task) = state
                .live
                .get_mut(&plan_id)
                .and_then(|plan| plan.tasks.get_mut(update.task_id))
            {
                // Progress is monotonic while a task runs.
                if task.status == TaskStatus::InProgress && update.progress > task.progress {
                    task.progress = update.progress;
                    advanced = true;
                }
            }
        }
        if advanced {
            self.emit(
                plan_id,
                SchedulerEventKind::TaskProgress {
                    task_id: update.task_id,
                    progress: update.progress,
                },
            );
        }
    }

    /// Applies a worker's terminal outcome. Returns the error that aborts
    /// the run, if this failure is fatal to the plan.
    fn finish_task(
        &self,
        plan_id: PlanId,
        run: &mut RunState,
        result: DispatchOutcome,
    ) -> Option<SchedulerError> {
        let id = result.task_id;
        run.running.remove(&id);

        match result.outcome {
            Ok(outcome) if outcome.success => {
                run.completed.insert(id);
                run.outputs.extend(outcome.outputs.iter().cloned());
                let now = self.clock.now();
                {
                    let mut state = self.state();
                    if let Some(task) = state
                        .live
                        .get_mut(&plan_id)
                        .and_then(|plan| plan.tasks.get_mut(id))
                    {
                        task.status = TaskStatus::Completed;
                        task.completed_at = Some(now);
                        task.progress = 100.0;
                        task.actual_minutes = task
                            .started_at
                            .map(|started| now.duration_since(started).as_secs_f64() / 60.0);
                        task.outputs = outcome.outputs;
                        task.blocked_by.clear();
                    }
                }
                log::debug!("task {id} of plan {plan_id} completed");
                self.emit(plan_id, SchedulerEventKind::TaskCompleted { task_id: id });
                None
            }
            Ok(outcome) => {
                let message = outcome
                    .error
                    .unwrap_or_else(|| "task reported failure".to_string());
                self.fail_task(plan_id, run, id, &message)
            }
            Err(err) => {
                let message = format!("{err:#}");
                self.fail_task(plan_id, run, id, &message)
            }
        }
    }

    /// Records a task failure. Returns the abort error when the failure
    /// is fatal: the task is critical, or it has a parent that can now
    /// never complete.
    fn fail_task(
        &self,
        plan_id: PlanId,
        run: &mut RunState,
        id: TaskId,
        message: &str,
    ) -> Option<SchedulerError> {
        run.failed.insert(id);
        let now = self.clock.now();
        let (critical, parent) = {
            let mut state = self.state();
            let task = state
                .live
                .get_mut(&plan_id)
                .and_then(|plan| plan.tasks.get_mut(id));
            let Some(task) = task else {
                return Some(SchedulerError::task_execution(id, message));
            };
            task.status = TaskStatus::Failed;
            task.completed_at = Some(now);
            task.error = Some(TaskError {
                message: message.to_string(),
                detail: None,
                occurred_at: now,
            });
            (task.is_critical(), task.parent)
        };
        log::warn!("task {id} of plan {plan_id} failed: {message}");
        self.emit(
            plan_id,
            SchedulerEventKind::TaskFailed {
                task_id: id,
                error: message.to_string(),
            },
        );

        if critical {
            return Some(SchedulerError::task_execution(id, message));
        }

        if let Some(parent_id) = parent {
            if run.failed.contains(&parent_id) {
                return Some(SchedulerError::task_execution(id, message));
            }
            // The parent's subtasks can no longer all complete, so the
            // parent fails with the propagated error, and the parent is
            // critical by definition.
            let propagated = format!("subtask {id} failed: {message}");
            run.failed.insert(parent_id);
            {
                let mut state = self.state();
                if let Some(task) = state
                    .live
                    .get_mut(&plan_id)
                    .and_then(|plan| plan.tasks.get_mut(parent_id))
                {
                    task.status = TaskStatus::Failed;
                    task.completed_at = Some(now);
                    task.error = Some(TaskError {
                        message: propagated.clone(),
                        detail: None,
                        occurred_at: now,
                    });
                }
            }
            self.emit(
                plan_id,
                SchedulerEventKind::TaskFailed {
                    task_id: parent_id,
                    error: propagated,
                },
            );
            return Some(SchedulerError::task_execution(id, message));
        }

        None
    }

    /// Marks every task the stalled run never dispatched as blocked,
    /// recording its unmet prerequisite ids.
    fn mark_stalled_blocked(&self, plan_id: PlanId, run: &mut RunState) {
        let skipped: Vec<TaskId> = run
            .queue
            .iter()
            .copied()
            .filter(|id| !run.dispatched.contains(id) && !run.failed.contains(id))
            .collect();

        for id in skipped {
            let unmet = run.unmet(id);
            if unmet.is_empty() {
                continue;
            }
            run.blocked.insert(id);
            {
                let mut state = self.state();
                if let Some(task) = state
                    .live
                    .get_mut(&plan_id)
                    .and_then(|plan| plan.tasks.get_mut(id))
                {
                    task.status = TaskStatus::Blocked;
                    task.blocked_by = unmet.clone();
                }
            }
            log::debug!("task {id} of plan {plan_id} blocked by {unmet:?}");
            self.emit(
                plan_id,
                SchedulerEventKind::TaskBlocked {
                    task_id: id,
                    blocked_by: unmet,
                },
            );
        }
    }

    /// Terminates the plan, archives it and assembles the report.
    fn finalize(
        &self,
        plan_id: PlanId,
        run: &RunState,
        abort: Option<&SchedulerError>,
        cancelled: bool,
    ) -> Result<ExecutionReport> {
        let success = run.failed.is_empty() && abort.is_none() && !cancelled;
        let now = self.clock.now();

        let (report, agent) = {
            let mut state = self.state();
            let Some(mut plan) = state.live.remove(&plan_id) else {
                return Err(SchedulerError::PlanNotFound { id: plan_id });
            };
            plan.status = if success {
                PlanStatus::Completed
            } else {
                PlanStatus::Failed
            };
            plan.completed_at = Some(now);
            let duration_minutes = plan
                .started_at
                .map(|started| now.duration_since(started).as_secs_f64() / 60.0)
                .unwrap_or(0.0);
            plan.actual_minutes = Some(duration_minutes);
            let cost = run.completed.len() as f64 * self.config.cost_per_task;
            plan.actual_cost = Some(cost);

            let report = ExecutionReport {
                plan_id,
                success,
                completed: run
                    .queue
                    .iter()
                    .copied()
                    .filter(|id| run.completed.contains(id))
                    .collect(),
                failed: run
                    .queue
                    .iter()
                    .copied()
                    .filter(|id| run.failed.contains(id))
                    .collect(),
                blocked: run
                    .queue
                    .iter()
                    .copied()
                    .filter(|id| run.blocked.contains(id))
                    .collect(),
                duration_minutes,
                cost,
                outputs: run.outputs.clone(),
            };
            let agent = plan.agent.clone();
            Self::archive(&mut state, plan, self.config.history_capacity);
            (report, agent)
        };

        if success {
            log::info!("plan {plan_id} for agent '{agent}' completed");
            self.emit(plan_id, SchedulerEventKind::PlanCompleted);
        } else {
            let error = if cancelled {
                "execution cancelled".to_string()
            } else if let Some(err) = abort {
                err.to_string()
            } else {
                format!("{} task(s) failed", report.failed.len())
            };
            log::warn!("plan {plan_id} for agent '{agent}' failed: {error}");
            self.emit(plan_id, SchedulerEventKind::PlanFailed { error });
        }

        Ok(report)
    }
}
