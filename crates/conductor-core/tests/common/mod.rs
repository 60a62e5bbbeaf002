//! Shared fakes and helpers for the integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use conductor_core::{
    Clock, ProgressReporter, TaskDescriptor, TaskExecutor, TaskOutcome,
};
use jiff::{SignedDuration, Timestamp};

/// Initializes test logging once; safe to call from every test.
#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Clock the tests advance by hand.
pub struct ManualClock(Mutex<Timestamp>);

#[allow(dead_code)]
impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self(Mutex::new(start))
    }

    pub fn starting_at_epoch() -> Arc<Self> {
        Arc::new(Self::new(Timestamp::UNIX_EPOCH))
    }

    pub fn advance(&self, step: SignedDuration) {
        let mut now = self.0.lock().unwrap();
        *now = *now + step;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.0.lock().unwrap()
    }
}

/// Deterministic executor driven by a per-description script.
///
/// Every execution is logged as `start <description>` / `end <description>`
/// so tests can assert ordering. Descriptions registered with
/// [`ScriptedExecutor::with_failure`] fail with the given message; all
/// other tasks succeed with one output artifact. Optionally advances a
/// [`ManualClock`] per executed task so durations are deterministic.
#[derive(Default)]
pub struct ScriptedExecutor {
    failures: HashMap<String, String>,
    log: Mutex<Vec<String>>,
    advance: Option<(Arc<ManualClock>, SignedDuration)>,
}

#[allow(dead_code)]
impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(mut self, description: &str, error: &str) -> Self {
        self.failures
            .insert(description.to_string(), error.to_string());
        self
    }

    pub fn with_clock_advance(mut self, clock: Arc<ManualClock>, step: SignedDuration) -> Self {
        self.advance = Some((clock, step));
        self
    }

    /// The `start`/`end` log recorded so far.
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Position of an entry in the log; panics when absent.
    pub fn log_index(&self, entry: &str) -> usize {
        self.log()
            .iter()
            .position(|line| line == entry)
            .unwrap_or_else(|| panic!("log entry '{entry}' not found"))
    }
}

#[async_trait]
impl TaskExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        task: TaskDescriptor,
        progress: ProgressReporter,
    ) -> anyhow::Result<TaskOutcome> {
        self.log
            .lock()
            .unwrap()
            .push(format!("start {}", task.description));
        if let Some((clock, step)) = &self.advance {
            clock.advance(*step);
        }
        progress.report(100.0);

        let outcome = match self.failures.get(&task.description) {
            Some(error) => TaskOutcome::failure(error.clone()),
            None => TaskOutcome::success(vec![format!("done: {}", task.description)]),
        };
        self.log
            .lock()
            .unwrap()
            .push(format!("end {}", task.description));
        Ok(outcome)
    }
}
