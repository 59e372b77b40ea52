// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error-path specs
//!
//! Verify failure reporting: the immediate `ERROR_OCCURRED` publication, the
//! deferred re-publication from the UI-thread poll, and state recovery.

use crate::prelude::*;

#[test]
fn failed_task_publishes_error_with_context() {
    let harness = Harness::started();
    let errors = Collector::watch(harness.bus(), &[EventType::ErrorOccurred]);

    harness
        .core
        .add_task(Task::new(|| Err(TaskError::failed("file is not a catalog"))))
        .unwrap();

    let events = errors.wait_for(1);
    assert_eq!(
        events[0].get("error"),
        Some(&json!("file is not a catalog"))
    );
    let context = events[0].get("context").unwrap();
    assert_eq!(context["operation"], json!("background task"));
    assert_eq!(context["severity"], json!("ERROR"));
    harness.core.stop();
}

#[test]
fn failed_task_moves_the_core_to_error_state() {
    let harness = Harness::started();
    harness
        .core
        .add_task(Task::new(|| Err(TaskError::failed("bad archive"))))
        .unwrap();

    assert!(wait_until(Duration::from_secs(5), || {
        harness.core.state() == ApplicationState::Error
    }));
    harness.core.stop();
}

#[test]
fn ui_poll_republishes_background_errors_once() {
    let harness = Harness::started();
    let errors = Collector::watch(harness.bus(), &[EventType::ErrorOccurred]);

    harness
        .core
        .add_task(Task::new(|| Err(TaskError::failed("transient"))))
        .unwrap();
    errors.wait_for(1);

    harness.core.process_background_tasks();
    assert_eq!(errors.len(), 2);
    harness.core.process_background_tasks();
    assert_eq!(errors.len(), 2);
    harness.core.stop();
}

#[test]
fn handle_error_carries_the_recovery_hint() {
    let harness = Harness::stopped();
    let errors = Collector::watch(harness.bus(), &[EventType::ErrorOccurred]);

    let context = ErrorContext::new("open catalog", ErrorSeverity::Warning)
        .with_detail("path", "/tmp/missing.json")
        .with_recovery("choose a different file");
    harness.core.handle_error("catalog not found", context);

    let events = errors.wait_for(1);
    let context = events[0].get("context").unwrap();
    assert_eq!(context["severity"], json!("WARNING"));
    assert_eq!(context["recovery_action"], json!("choose a different file"));
    assert_eq!(context["details"]["path"], json!("/tmp/missing.json"));
}

#[test]
fn worker_keeps_serving_after_a_failure() {
    let harness = Harness::started();
    let completed = Collector::watch(harness.bus(), &[EventType::TaskCompleted]);

    harness
        .core
        .add_task(Task::new(|| Err(TaskError::failed("first one fails"))))
        .unwrap();
    assert!(wait_until(Duration::from_secs(5), || {
        harness.core.state() == ApplicationState::Error
    }));

    harness
        .core
        .state_manager()
        .update_state(ApplicationState::Idle);
    harness
        .core
        .add_task(Task::new(|| Ok(json!("second one works"))))
        .unwrap();

    let events = completed.wait_for(1);
    assert_eq!(events[0].get("result"), Some(&json!("second one works")));
    harness.core.stop();
}

#[test]
fn a_failing_subscriber_does_not_stop_delivery() {
    let harness = Harness::started();
    let bus = harness.bus();

    let failing: Arc<dyn EventHandler> = Arc::new(|_: &Event| -> Result<(), ck_core::HandlerError> {
        Err("listener is broken".into())
    });
    bus.subscribe(EventType::TaskCompleted, failing);
    let completed = Collector::watch(bus, &[EventType::TaskCompleted]);

    harness
        .core
        .add_task(Task::new(|| Ok(json!(1))))
        .unwrap();

    let events = completed.wait_for(1);
    assert_eq!(events[0].get("result"), Some(&json!(1)));
    harness.core.stop();
}
