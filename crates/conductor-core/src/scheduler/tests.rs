//! Tests for the scheduler module.

use super::*;
use crate::error::SchedulerError;
use crate::events::SchedulerEventKind;
use crate::models::PlanStatus;
use crate::params::{CreatePlan, Id, RejectPlan, TaskSpec};

/// Helper function to create a test scheduler with manual approval.
fn create_test_scheduler() -> Scheduler {
    SchedulerBuilder::new()
        .build()
        .expect("Failed to create scheduler")
}

fn deploy_params() -> CreatePlan {
    CreatePlan {
        agent: "orchestrator".to_string(),
        root_task: "Deploy service".to_string(),
        tasks: vec![TaskSpec {
            subtasks: vec![
                TaskSpec {
                    label: Some("build".to_string()),
                    assigned_agent: Some("builder".to_string()),
                    ..TaskSpec::new("Build")
                },
                TaskSpec {
                    assigned_agent: Some("tester".to_string()),
                    is_subagent_task: true,
                    depends_on: vec!["build".to_string()],
                    ..TaskSpec::new("Test")
                },
            ],
            ..TaskSpec::new("Deploy service")
        }],
        ..CreatePlan::default()
    }
}

#[test]
fn builder_rejects_zero_history_capacity() {
    let result = SchedulerBuilder::new().history_capacity(0).build();
    assert!(matches!(
        result.unwrap_err(),
        SchedulerError::InvalidInput { field, .. } if field == "history_capacity"
    ));
}

#[test]
fn builder_rejects_zero_workers() {
    let result = SchedulerBuilder::new().max_concurrent(0).build();
    assert!(matches!(
        result.unwrap_err(),
        SchedulerError::InvalidInput { field, .. } if field == "max_concurrent"
    ));
}

#[tokio::test]
async fn create_plan_builds_tree_and_derives_metadata() {
    let scheduler = create_test_scheduler();
    let plan = scheduler
        .create_plan(&deploy_params())
        .await
        .expect("Failed to create plan");

    assert_eq!(plan.status, PlanStatus::ApprovalRequested);
    assert_eq!(plan.tasks.len(), 3);
    assert_eq!(plan.tasks.roots().len(), 1);

    let root = plan.tasks.get(plan.tasks.roots()[0]).unwrap();
    assert_eq!(root.depth, 0);
    assert_eq!(root.subtasks.len(), 2);
    assert!(root.is_critical());

    // Estimates come from the per-task default (3 tasks at 5 min, 1000 units).
    assert_eq!(plan.estimated_minutes, 15.0);
    assert_eq!(plan.estimated_cost, 3000.0);

    assert_eq!(plan.involved_agents, vec!["builder", "tester"]);
    assert_eq!(plan.subagent_count, 1);
}

#[tokio::test]
async fn create_plan_respects_supplied_estimates() {
    let scheduler = create_test_scheduler();
    let plan = scheduler
        .create_plan(&CreatePlan {
            estimated_minutes: Some(42.0),
            estimated_cost: Some(7.0),
            ..deploy_params()
        })
        .await
        .expect("Failed to create plan");

    assert_eq!(plan.estimated_minutes, 42.0);
    assert_eq!(plan.estimated_cost, 7.0);
}

#[tokio::test]
async fn create_plan_without_tasks_uses_breakdown_placeholder() {
    let scheduler = create_test_scheduler();
    let plan = scheduler
        .create_plan(&CreatePlan {
            agent: "orchestrator".to_string(),
            root_task: "Refactor the parser".to_string(),
            ..CreatePlan::default()
        })
        .await
        .expect("Failed to create plan");

    // One root split into research / implement / verify phases.
    assert_eq!(plan.tasks.len(), 4);
    let root = plan.tasks.get(plan.tasks.roots()[0]).unwrap();
    assert_eq!(root.description, "Refactor the parser");
    assert_eq!(root.subtasks.len(), 3);
}

#[tokio::test]
async fn create_plan_resolves_dependency_labels() {
    let scheduler = create_test_scheduler();
    let plan = scheduler
        .create_plan(&deploy_params())
        .await
        .expect("Failed to create plan");

    let root = plan.tasks.get(plan.tasks.roots()[0]).unwrap();
    let build_id = root.subtasks[0];
    let test_id = root.subtasks[1];
    assert_eq!(plan.tasks.get(test_id).unwrap().depends_on, vec![build_id]);

    // Two enables edges (root to each child) plus one blocks edge.
    assert_eq!(plan.dependencies.len(), 3);
}

#[tokio::test]
async fn create_plan_rejects_unknown_dependency_label() {
    let scheduler = create_test_scheduler();
    let result = scheduler
        .create_plan(&CreatePlan {
            agent: "orchestrator".to_string(),
            root_task: "Ship".to_string(),
            tasks: vec![TaskSpec {
                depends_on: vec!["nonexistent".to_string()],
                ..TaskSpec::new("Test")
            }],
            ..CreatePlan::default()
        })
        .await;

    assert!(matches!(
        result.unwrap_err(),
        SchedulerError::InvalidInput { field, .. } if field == "depends_on"
    ));
}

#[tokio::test]
async fn create_plan_rejects_duplicate_labels() {
    let scheduler = create_test_scheduler();
    let result = scheduler
        .create_plan(&CreatePlan {
            agent: "orchestrator".to_string(),
            root_task: "Ship".to_string(),
            tasks: vec![
                TaskSpec {
                    label: Some("step".to_string()),
                    ..TaskSpec::new("First")
                },
                TaskSpec {
                    label: Some("step".to_string()),
                    ..TaskSpec::new("Second")
                },
            ],
            ..CreatePlan::default()
        })
        .await;

    assert!(matches!(
        result.unwrap_err(),
        SchedulerError::InvalidInput { field, .. } if field == "label"
    ));
}

#[tokio::test]
async fn create_plan_detects_dependency_cycles() {
    let scheduler = create_test_scheduler();
    let result = scheduler
        .create_plan(&CreatePlan {
            agent: "orchestrator".to_string(),
            root_task: "Ship".to_string(),
            tasks: vec![
                TaskSpec {
                    label: Some("a".to_string()),
                    depends_on: vec!["b".to_string()],
                    ..TaskSpec::new("A")
                },
                TaskSpec {
                    label: Some("b".to_string()),
                    depends_on: vec!["a".to_string()],
                    ..TaskSpec::new("B")
                },
            ],
            ..CreatePlan::default()
        })
        .await;

    assert!(matches!(
        result.unwrap_err(),
        SchedulerError::CyclicDependency { .. }
    ));
}

#[tokio::test]
async fn auto_approve_skips_the_approval_request() {
    let scheduler = SchedulerBuilder::new()
        .auto_approve(true)
        .build()
        .expect("Failed to create scheduler");

    let plan = scheduler
        .create_plan(&deploy_params())
        .await
        .expect("Failed to create plan");

    assert_eq!(plan.status, PlanStatus::Approved);
    assert!(plan.approved_at.is_some());
}

#[tokio::test]
async fn approve_plan_transitions_and_timestamps() {
    let scheduler = create_test_scheduler();
    let plan = scheduler
        .create_plan(&deploy_params())
        .await
        .expect("Failed to create plan");
    assert!(plan.approved_at.is_none());

    let approved = scheduler
        .approve_plan(&Id { id: plan.id })
        .await
        .expect("Failed to approve plan");

    assert_eq!(approved.status, PlanStatus::Approved);
    assert!(approved.approved_at.is_some());
}

#[tokio::test]
async fn approve_plan_unknown_id_fails() {
    let scheduler = create_test_scheduler();
    let result = scheduler.approve_plan(&Id { id: 999 }).await;
    assert!(matches!(
        result.unwrap_err(),
        SchedulerError::PlanNotFound { id: 999 }
    ));
}

#[tokio::test]
async fn approve_plan_twice_fails() {
    let scheduler = create_test_scheduler();
    let plan = scheduler
        .create_plan(&deploy_params())
        .await
        .expect("Failed to create plan");

    scheduler
        .approve_plan(&Id { id: plan.id })
        .await
        .expect("Failed to approve plan");
    let result = scheduler.approve_plan(&Id { id: plan.id }).await;

    assert!(matches!(
        result.unwrap_err(),
        SchedulerError::InvalidInput { field, .. } if field == "status"
    ));
}

#[tokio::test]
async fn reject_plan_archives_with_reason() {
    let scheduler = create_test_scheduler();
    let plan = scheduler
        .create_plan(&deploy_params())
        .await
        .expect("Failed to create plan");

    let rejected = scheduler
        .reject_plan(&RejectPlan {
            id: plan.id,
            reason: "estimate too high".to_string(),
        })
        .await
        .expect("Failed to reject plan");

    assert_eq!(rejected.status, PlanStatus::Rejected);
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some("estimate too high")
    );

    // Gone from the live map, retrievable from history.
    assert!(scheduler.live_plans().await.is_empty());
    let archived = scheduler
        .get_plan(&Id { id: plan.id })
        .await
        .expect("Query failed")
        .expect("Plan should be in history");
    assert_eq!(archived.status, PlanStatus::Rejected);
}

#[tokio::test]
async fn history_is_bounded_and_most_recent_first() {
    let scheduler = SchedulerBuilder::new()
        .history_capacity(2)
        .build()
        .expect("Failed to create scheduler");

    let mut ids = Vec::new();
    for i in 0..3 {
        let plan = scheduler
            .create_plan(&CreatePlan {
                agent: "orchestrator".to_string(),
                root_task: format!("Job {i}"),
                tasks: vec![TaskSpec::new(format!("Task {i}"))],
                ..CreatePlan::default()
            })
            .await
            .expect("Failed to create plan");
        scheduler
            .reject_plan(&RejectPlan {
                id: plan.id,
                reason: "not needed".to_string(),
            })
            .await
            .expect("Failed to reject plan");
        ids.push(plan.id);
    }

    let history = scheduler.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, ids[2]);
    assert_eq!(history[1].id, ids[1]);

    // The oldest plan was evicted and is no longer retrievable.
    let evicted = scheduler
        .get_plan(&Id { id: ids[0] })
        .await
        .expect("Query failed");
    assert!(evicted.is_none());
}

#[tokio::test]
async fn plan_status_searches_live_then_history() {
    let scheduler = create_test_scheduler();
    let plan = scheduler
        .create_plan(&deploy_params())
        .await
        .expect("Failed to create plan");

    assert_eq!(
        scheduler.plan_status(&Id { id: plan.id }).await.unwrap(),
        PlanStatus::ApprovalRequested
    );

    scheduler
        .reject_plan(&RejectPlan {
            id: plan.id,
            reason: "no".to_string(),
        })
        .await
        .expect("Failed to reject plan");

    assert_eq!(
        scheduler.plan_status(&Id { id: plan.id }).await.unwrap(),
        PlanStatus::Rejected
    );
    assert!(matches!(
        scheduler.plan_status(&Id { id: 999 }).await.unwrap_err(),
        SchedulerError::PlanNotFound { id: 999 }
    ));
}

#[tokio::test]
async fn visualization_is_idempotent() {
    let scheduler = create_test_scheduler();
    let plan = scheduler
        .create_plan(&deploy_params())
        .await
        .expect("Failed to create plan");

    let first = scheduler.visualize(&Id { id: plan.id }).await.unwrap();
    let second = scheduler.visualize(&Id { id: plan.id }).await.unwrap();
    assert_eq!(first, second);
    assert!(first.contains("Deploy service"));
    assert!(first.contains("blocks: Build --> Test"));
}

#[tokio::test]
async fn creation_emits_created_and_approval_requested() {
    let scheduler = create_test_scheduler();
    let mut events = scheduler.subscribe();

    let plan = scheduler
        .create_plan(&deploy_params())
        .await
        .expect("Failed to create plan");

    let created = events.recv().await.expect("missing event");
    assert_eq!(created.plan_id, plan.id);
    assert!(matches!(created.kind, SchedulerEventKind::PlanCreated));

    let requested = events.recv().await.expect("missing event");
    match requested.kind {
        SchedulerEventKind::PlanApprovalRequested { visualization } => {
            assert!(visualization.contains("Deploy service"));
        }
        other => panic!("expected approval request, got {other:?}"),
    }
}
