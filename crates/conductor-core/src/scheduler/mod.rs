//! High-level scheduler API for managing and executing plans.
//!
//! This module provides the main [`Scheduler`] interface: the central
//! coordinator that owns the live plan map and the bounded history,
//! drives the approval workflow, and executes approved plans through the
//! injected executor.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │    Lifecycle    │    │    Execution    │    │    Executor     │
//! │ (create/approve │───▶│ (ready-set loop │───▶│  (injected via  │
//! │  /reject/query) │    │  over the queue)│    │   TaskExecutor) │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!        Workflow           Orchestration          External work
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: factory for configured [`Scheduler`] instances
//! - `lifecycle`: plan creation, approval workflow, archival and queries
//! - `execution`: the ready-set execution loop and [`ExecutionReport`]
//!
//! ## Design Principles
//!
//! 1. **Injected collaborators**: clock and executor are constructor
//!    inputs, so tests control time and work deterministically
//! 2. **Short critical sections**: one mutex guards all scheduler state
//!    and is never held across an await
//! 3. **Observable**: every state transition is published on a broadcast
//!    topic with stable event names
//! 4. **Bounded memory**: terminal plans move to a most-recent-first
//!    history that evicts its oldest entry at capacity

pub mod builder;
mod execution;
mod lifecycle;

#[cfg(test)]
mod tests;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;

use crate::clock::Clock;
use crate::events::{SchedulerEvent, SchedulerEventKind};
use crate::executor::TaskExecutor;
use crate::models::{Plan, PlanId};

// Re-export the main types
pub use builder::SchedulerBuilder;
pub use execution::ExecutionReport;

/// Tunables for a scheduler instance.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Approve plans at creation instead of requesting approval
    pub auto_approve: bool,

    /// Maximum number of archived plans retained in history
    pub history_capacity: usize,

    /// Maximum number of tasks executing at the same time
    pub max_concurrent: usize,

    /// Duration estimate applied to tasks without their own, in minutes
    pub default_task_minutes: f64,

    /// Cost estimate per task, in abstract units
    pub cost_per_task: f64,

    /// Per-task execution deadline; unlimited when `None`
    pub task_timeout: Option<Duration>,

    /// Capacity of the event broadcast channel
    pub event_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            auto_approve: false,
            history_capacity: 100,
            max_concurrent: 4,
            default_task_minutes: 5.0,
            cost_per_task: 1000.0,
            task_timeout: None,
            event_capacity: 256,
        }
    }
}

pub(crate) struct SchedulerState {
    pub(crate) live: HashMap<PlanId, Plan>,
    pub(crate) history: VecDeque<Plan>,
}

/// Main scheduler interface for managing and executing plans.
pub struct Scheduler {
    pub(crate) config: SchedulerConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) executor: Arc<dyn TaskExecutor>,
    inner: Mutex<SchedulerState>,
    events: broadcast::Sender<SchedulerEvent>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Creates a scheduler with the given configuration and collaborators.
    pub(crate) fn new(
        config: SchedulerConfig,
        clock: Arc<dyn Clock>,
        executor: Arc<dyn TaskExecutor>,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            config,
            clock,
            executor,
            inner: Mutex::new(SchedulerState {
                live: HashMap::new(),
                history: VecDeque::new(),
            }),
            events,
            next_id: AtomicU64::new(1),
        }
    }

    /// Subscribes to the scheduler's event topic.
    ///
    /// Each receiver observes every event emitted after the call. Slow
    /// receivers may lag and lose the oldest buffered events, as usual
    /// for a broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.events.subscribe()
    }

    /// The configuration this scheduler was built with.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub(crate) fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Locks the scheduler state, recovering from poisoning.
    ///
    /// A panicked worker must not wedge unrelated plans, so a poisoned
    /// lock is taken over rather than propagated.
    pub(crate) fn state(&self) -> MutexGuard<'_, SchedulerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes an event stamped with the scheduler clock.
    ///
    /// Delivery is best-effort; emitting without subscribers is not an
    /// error.
    pub(crate) fn emit(&self, plan_id: PlanId, kind: SchedulerEventKind) {
        let event = SchedulerEvent::new(self.clock.now(), plan_id, kind);
        let _ = self.events.send(event);
    }

    /// Moves a terminal plan into history, evicting beyond capacity.
    pub(crate) fn archive(state: &mut SchedulerState, plan: Plan, capacity: usize) {
        state.history.push_front(plan);
        while state.history.len() > capacity {
            state.history.pop_back();
        }
    }
}
