//! Core library for the Conductor hierarchical task plan scheduler.
//!
//! This crate turns a high-level task description into a tree of
//! subtasks, tracks dependencies between them, decides execution order,
//! and reports live progress. It owns the plan lifecycle (creation,
//! approval workflow, archival into a bounded history), derives the
//! dependency graph (implicit parent-to-child `enables` edges plus
//! explicit `blocks` edges), executes the ready set through an injected
//! executor, and projects progress, ETA and a text visualization on
//! demand.
//!
//! The actual work behind a task is performed by an external
//! [`executor::TaskExecutor`]; pattern-learning storage, CLI surfaces and
//! dashboards are external consumers that observe the scheduler through
//! its event topic.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use conductor_core::{
//!     params::{CreatePlan, Id, TaskSpec},
//!     SchedulerBuilder,
//! };
//!
//! # async fn example() -> conductor_core::Result<()> {
//! let scheduler = SchedulerBuilder::new().auto_approve(true).build()?;
//!
//! let plan = scheduler
//!     .create_plan(&CreatePlan {
//!         agent: "orchestrator".to_string(),
//!         root_task: "Deploy service".to_string(),
//!         tasks: vec![
//!             TaskSpec {
//!                 label: Some("build".to_string()),
//!                 ..TaskSpec::new("Build")
//!             },
//!             TaskSpec {
//!                 depends_on: vec!["build".to_string()],
//!                 ..TaskSpec::new("Test")
//!             },
//!         ],
//!         ..CreatePlan::default()
//!     })
//!     .await?;
//!
//! let report = scheduler.execute_plan(&Id { id: plan.id }).await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod display;
pub mod error;
pub mod events;
pub mod executor;
pub mod graph;
pub mod models;
pub mod params;
pub mod progress;
pub mod scheduler;

// Re-export commonly used types
pub use clock::{Clock, SystemClock};
pub use display::{LocalDateTime, PlanVisualization};
pub use error::{Result, SchedulerError};
pub use events::{SchedulerEvent, SchedulerEventKind};
pub use executor::{
    ProgressReporter, SimulatedExecutor, TaskDescriptor, TaskExecutor, TaskOutcome,
};
pub use models::{
    DependencyEdge, DependencyKind, Plan, PlanId, PlanStatus, PlanSummary, Task, TaskArena,
    TaskError, TaskId, TaskStatus,
};
pub use params::{CreatePlan, Id, RejectPlan, TaskSpec};
pub use scheduler::{ExecutionReport, Scheduler, SchedulerBuilder, SchedulerConfig};
