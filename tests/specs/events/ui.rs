// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! UI action translation specs
//!
//! Verify that generic `UI_ACTION` events refine into typed actions through a
//! pure translation, leaving the original event untouched.

use crate::prelude::*;
use ck_core::events::refine_ui_action;
use ck_core::UiAction;

#[test]
fn named_action_refines_into_a_typed_event() {
    let event = Event::new(EventType::UiAction)
        .with_data("action", "EXTRACT_ADDRESSES")
        .with_data("path", "/tmp/catalog.json")
        .with_source("ck.ui.menu");

    let (action, derived) = refine_ui_action(&event).unwrap();
    assert_eq!(action, UiAction::ExtractAddresses);
    assert_eq!(derived.get("path"), Some(&json!("/tmp/catalog.json")));
    assert_eq!(derived.source(), Some("ck.ui.menu"));
    assert_ne!(derived.id(), event.id());
}

#[test]
fn refinement_does_not_mutate_the_original() {
    let event = Event::new(EventType::UiAction).with_data("action", "NAVIGATE_HOME");
    let before = event.clone();

    let _ = refine_ui_action(&event).unwrap();
    assert_eq!(event, before);
}

#[test]
fn unknown_action_names_do_not_refine() {
    let event = Event::new(EventType::UiAction).with_data("action", "DO_A_BARREL_ROLL");
    assert!(refine_ui_action(&event).is_none());
}

#[test]
fn events_of_other_types_do_not_refine() {
    let event = Event::new(EventType::DataUpdated).with_data("action", "NAVIGATE_HOME");
    assert!(refine_ui_action(&event).is_none());
}

#[test]
fn a_subscriber_can_rebroadcast_the_refined_event() {
    let bus = EventBus::new();
    let refined = Collector::watch(&bus, &[EventType::DataUpdated]);

    let rebroadcaster = bus.clone();
    let handler: Arc<dyn EventHandler> =
        Arc::new(move |event: &Event| -> Result<(), ck_core::HandlerError> {
            if let Some((UiAction::UpdateLanguage, derived)) = refine_ui_action(event) {
                rebroadcaster.publish(
                    Event::new(EventType::DataUpdated)
                        .with_data("language", derived.get("language").cloned().unwrap_or_default()),
                );
            }
            Ok(())
        });
    bus.subscribe(EventType::UiAction, handler);

    bus.publish(
        Event::new(EventType::UiAction)
            .with_data("action", "UPDATE_LANGUAGE")
            .with_data("language", "ru"),
    );

    let events = refined.wait_for(1);
    assert_eq!(events[0].get("language"), Some(&json!("ru")));
}
