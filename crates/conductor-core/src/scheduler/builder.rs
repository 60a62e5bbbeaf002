//! Builder for creating and configuring Scheduler instances.

use std::sync::Arc;
use std::time::Duration;

use super::{Scheduler, SchedulerConfig};
use crate::clock::{Clock, SystemClock};
use crate::error::{Result, SchedulerError};
use crate::executor::{SimulatedExecutor, TaskExecutor};

/// Builder for creating and configuring Scheduler instances.
///
/// # Examples
///
/// ```rust
/// use conductor_core::SchedulerBuilder;
///
/// # fn example() -> conductor_core::Result<()> {
/// // Defaults: manual approval, history of 100, 4 workers,
/// // the simulated executor and the system clock.
/// let scheduler = SchedulerBuilder::new().build()?;
///
/// // Or tuned for an embedded deployment:
/// let scheduler = SchedulerBuilder::new()
///     .auto_approve(true)
///     .history_capacity(10)
///     .max_concurrent(1)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    clock: Option<Arc<dyn Clock>>,
    executor: Option<Arc<dyn TaskExecutor>>,
}

impl SchedulerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
            clock: None,
            executor: None,
        }
    }

    /// Approve plans at creation instead of requesting approval.
    pub fn auto_approve(mut self, auto_approve: bool) -> Self {
        self.config.auto_approve = auto_approve;
        self
    }

    /// Sets how many archived plans the history retains.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    /// Sets how many tasks may execute concurrently.
    ///
    /// A value of 1 reproduces a strictly sequential pass in topological
    /// queue order.
    pub fn max_concurrent(mut self, workers: usize) -> Self {
        self.config.max_concurrent = workers;
        self
    }

    /// Sets the duration estimate applied to tasks without their own.
    pub fn default_task_minutes(mut self, minutes: f64) -> Self {
        self.config.default_task_minutes = minutes;
        self
    }

    /// Sets the per-task cost estimate, in abstract units.
    pub fn cost_per_task(mut self, cost: f64) -> Self {
        self.config.cost_per_task = cost;
        self
    }

    /// Sets a per-task execution deadline.
    pub fn task_timeout(mut self, timeout: Duration) -> Self {
        self.config.task_timeout = Some(timeout);
        self
    }

    /// Injects a custom time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Injects the executor that performs the tasks' actual work.
    ///
    /// When not set, the [`SimulatedExecutor`] placeholder is used.
    pub fn with_executor(mut self, executor: Arc<dyn TaskExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Builds the configured scheduler instance.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidInput` when `history_capacity` or
    /// `max_concurrent` is zero.
    pub fn build(self) -> Result<Scheduler> {
        if self.config.history_capacity == 0 {
            return Err(SchedulerError::invalid_input(
                "history_capacity",
                "history must retain at least one plan",
            ));
        }
        if self.config.max_concurrent == 0 {
            return Err(SchedulerError::invalid_input(
                "max_concurrent",
                "at least one worker is required",
            ));
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let executor = self
            .executor
            .unwrap_or_else(|| Arc::new(SimulatedExecutor::default()));
        Ok(Scheduler::new(self.config, clock, executor))
    }
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
