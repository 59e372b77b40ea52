// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Application state machine with transition history
//!
//! Single source of truth for the application state. Every distinct
//! transition is published as `STATE_CHANGED`; self-transitions are
//! suppressed so a subscriber re-applying the same state cannot start a
//! feedback loop.

use crate::event::Event;
use crate::events::EventBus;
use std::sync::Mutex;
use tracing::info;

/// Closed set of application states, exactly one current at any instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationState {
    /// Construction-only, never re-entered
    Initializing,
    /// No active background work
    Idle,
    /// Worker is executing tasks
    Processing,
    /// Awaiting an external resource (collaborator-driven)
    Waiting,
    /// Last task failed; sticky until explicitly cleared
    Error,
    /// Fully initialized, pre-IDLE milestone
    Ready,
    /// Operator-requested suspension (collaborator-driven)
    Paused,
    /// Stop in progress
    ShuttingDown,
}

impl ApplicationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationState::Initializing => "initializing",
            ApplicationState::Idle => "idle",
            ApplicationState::Processing => "processing",
            ApplicationState::Waiting => "waiting",
            ApplicationState::Error => "error",
            ApplicationState::Ready => "ready",
            ApplicationState::Paused => "paused",
            ApplicationState::ShuttingDown => "shutting_down",
        }
    }
}

impl std::fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

struct Inner {
    state: ApplicationState,
    history: Vec<ApplicationState>,
}

/// Guarded state variable shared between the UI thread and the worker.
///
/// `STATE_CHANGED` is published outside the lock, so a subscriber may read
/// or update the state from inside its handler without deadlocking.
pub struct StateManager {
    bus: EventBus,
    inner: Mutex<Inner>,
}

impl StateManager {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            inner: Mutex::new(Inner {
                state: ApplicationState::Initializing,
                history: vec![ApplicationState::Initializing],
            }),
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> ApplicationState {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).state
    }

    /// Transition to `new_state` and publish `STATE_CHANGED`.
    ///
    /// No-op (and no event) when `new_state` equals the current state.
    pub fn update_state(&self, new_state: ApplicationState) {
        let old_state = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            if inner.state == new_state {
                return;
            }
            let old_state = inner.state;
            inner.state = new_state;
            inner.history.push(new_state);
            old_state
        };

        info!(old = %old_state, new = %new_state, "state changed");
        // Publish after releasing the lock: a subscriber may call back in
        self.bus.publish(Event::state_changed(old_state, new_state));
    }

    /// Every distinct state occupied, oldest first. Diagnostics only.
    pub fn history(&self) -> Vec<ApplicationState> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .history
            .clone()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
