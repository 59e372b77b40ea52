// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core lifecycle specs
//!
//! Verify start/submit/stop as observed through the event stream, the state
//! history, and the persisted metrics file.

use crate::prelude::*;

#[test]
fn submitted_task_result_reaches_subscribers() {
    let harness = Harness::started();
    let completed = Collector::watch(harness.bus(), &[EventType::TaskCompleted]);

    harness
        .core
        .add_task(Task::new(|| Ok(json!({"addresses": 12}))).with_description("extract addresses"))
        .unwrap();

    let events = completed.wait_for(1);
    assert_eq!(events[0].get("result"), Some(&json!({"addresses": 12})));
    assert!(events[0].get("execution_time").is_some());
    harness.core.stop();
}

#[test]
fn task_progress_brackets_the_work() {
    let harness = Harness::started();
    let progress = Collector::watch(harness.bus(), &[EventType::ProgressUpdated]);

    harness
        .core
        .add_task(Task::new(|| Ok(json!(null))).with_description("convert images"))
        .unwrap();

    let events = progress.wait_for(2);
    assert_eq!(events[0].get("progress"), Some(&json!(0)));
    assert_eq!(events[1].get("progress"), Some(&json!(100)));
    harness.core.stop();
}

#[test]
fn state_transitions_are_published_as_events() {
    let harness = Harness::stopped();
    let changes = Collector::watch(harness.bus(), &[EventType::StateChanged]);

    harness.core.start();
    harness.settle();

    let events = changes.wait_for(2);
    assert_eq!(events[0].get("old_state"), Some(&json!("initializing")));
    assert_eq!(events[0].get("new_state"), Some(&json!("ready")));
    assert_eq!(events[1].get("new_state"), Some(&json!("idle")));
    harness.core.stop();
}

#[test]
fn state_history_records_the_full_run() {
    let harness = Harness::started();
    harness
        .core
        .add_task(Task::new(|| Ok(json!(null))))
        .unwrap();
    harness.settle();
    harness.core.stop();

    let history = harness.core.state_manager().history();
    assert_eq!(history.first(), Some(&ApplicationState::Initializing));
    assert!(history.contains(&ApplicationState::Processing));
    assert_eq!(history.last(), Some(&ApplicationState::ShuttingDown));
}

#[test]
fn stop_rejects_further_work() {
    let harness = Harness::started();
    harness.core.stop();

    let result = harness.core.add_task(Task::new(|| Ok(json!(null))));
    assert!(matches!(result, Err(CoreError::ShuttingDown)));
}

#[test]
fn stop_writes_a_metrics_snapshot() {
    let harness = Harness::started();
    for _ in 0..3 {
        harness
            .core
            .add_task(Task::new(|| Ok(json!(null))))
            .unwrap();
    }
    harness.settle();
    assert!(wait_until(Duration::from_secs(5), || {
        harness.core.metrics().snapshot(Instant::now()).tasks_completed == 3
    }));
    harness.core.stop();

    let raw = std::fs::read_to_string(harness.metrics_file()).unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(snapshot["tasks_submitted"], json!(3));
    assert_eq!(snapshot["tasks_completed"], json!(3));
    assert_eq!(snapshot["tasks_failed"], json!(0));
}

#[test]
fn stop_interrupts_a_cooperative_task_promptly() {
    let harness = Harness::started();
    let token = harness.core.cancel_token();
    harness
        .core
        .add_task(Task::new(move || {
            loop {
                if token.is_cancelled() {
                    return Err(TaskError::Cancelled);
                }
                std::thread::sleep(Duration::from_millis(5));
            }
        }))
        .unwrap();
    std::thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    harness.core.stop();
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn several_tasks_complete_in_submission_order() {
    let harness = Harness::started();
    let completed = Collector::watch(harness.bus(), &[EventType::TaskCompleted]);

    for i in 0..4 {
        harness
            .core
            .add_task(Task::new(move || Ok(json!(i))))
            .unwrap();
    }

    let events = completed.wait_for(4);
    let results: Vec<_> = events.iter().map(|e| e.get("result").cloned()).collect();
    assert_eq!(
        results,
        vec![Some(json!(0)), Some(json!(1)), Some(json!(2)), Some(json!(3))]
    );
    harness.core.stop();
}
