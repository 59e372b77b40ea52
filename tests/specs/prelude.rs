// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for the behavioral specs.
//!
//! `Harness` owns an [`ApplicationCore`] wired to short poll intervals and a
//! temp metrics path; `Collector` records every published event of the
//! watched types so specs assert on the event stream a UI would receive.

#![allow(dead_code)]

pub use ck_core::{
    ApplicationCore, ApplicationState, CoreConfig, CoreError, ErrorContext, ErrorSeverity, Event,
    EventBus, EventHandler, EventType, Task, TaskError,
};
pub use serde_json::json;
pub use std::sync::{Arc, Mutex};
pub use std::time::{Duration, Instant};

use ck_core::HandlerError;

/// Event log filled by a subscribed handler.
pub struct Collector {
    received: Arc<Mutex<Vec<Event>>>,
}

impl Collector {
    /// Subscribe to each of `types` on `bus`, recording every delivery.
    pub fn watch(bus: &EventBus, types: &[EventType]) -> Self {
        let received: Arc<Mutex<Vec<Event>>> = Arc::new(Mutex::new(Vec::new()));
        for event_type in types {
            let sink = Arc::clone(&received);
            let handler: Arc<dyn EventHandler> =
                Arc::new(move |event: &Event| -> Result<(), HandlerError> {
                    sink.lock().unwrap().push(event.clone());
                    Ok(())
                });
            assert!(bus.subscribe(*event_type, handler));
        }
        Self { received }
    }

    pub fn events(&self) -> Vec<Event> {
        self.received.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tags of the received events, in delivery order.
    pub fn types(&self) -> Vec<EventType> {
        self.events().iter().map(Event::event_type).collect()
    }

    /// Block until at least `count` events arrived, panicking on timeout.
    pub fn wait_for(&self, count: usize) -> Vec<Event> {
        assert!(
            wait_until(Duration::from_secs(5), || self.len() >= count),
            "expected {} events, saw {} before the deadline",
            count,
            self.len()
        );
        self.events()
    }
}

/// Poll `cond` until it holds or the deadline passes.
pub fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}

/// A started core with spec-friendly timings and a temp metrics path.
pub struct Harness {
    pub core: ApplicationCore,
    temp: tempfile::TempDir,
}

impl Harness {
    pub fn started() -> Self {
        let harness = Self::stopped();
        harness.core.start();
        assert!(wait_until(Duration::from_secs(5), || {
            harness.core.state() == ApplicationState::Idle
        }));
        harness
    }

    pub fn stopped() -> Self {
        let temp = tempfile::tempdir().unwrap();
        let config = CoreConfig {
            queue_capacity: None,
            poll_interval: Duration::from_millis(20),
            join_timeout: Duration::from_millis(500),
            metrics_path: Some(temp.path().join("metrics.json")),
        };
        Self {
            core: ApplicationCore::with_config(EventBus::new(), config),
            temp,
        }
    }

    pub fn bus(&self) -> &EventBus {
        self.core.bus()
    }

    pub fn metrics_file(&self) -> std::path::PathBuf {
        self.temp.path().join("metrics.json")
    }

    /// Wait until the core has drained its queue back to IDLE.
    pub fn settle(&self) {
        assert!(wait_until(Duration::from_secs(5), || {
            self.core.state() == ApplicationState::Idle
        }));
    }
}
