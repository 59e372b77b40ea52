// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event model: typed tags with static category/priority, immutable payloads
//!
//! Every event type is statically bound to a category and a priority. The
//! priority drives delivery order on the bus (critical errors reach
//! subscribers before progress chatter emitted in the same burst); the
//! category exists for filtering and diagnostics only.

use crate::error::ErrorContext;
use crate::state::ApplicationState;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Payload map carried by an event. Producers and consumers agree on the
/// shape per event type; the bus never inspects it.
pub type EventData = serde_json::Map<String, Value>;

/// Delivery priority, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventPriority {
    Low,
    Normal,
    High,
    Critical,
}

impl EventPriority {
    /// Numeric weight: LOW=0 .. CRITICAL=3
    pub fn weight(&self) -> u8 {
        match self {
            EventPriority::Low => 0,
            EventPriority::Normal => 1,
            EventPriority::High => 2,
            EventPriority::Critical => 3,
        }
    }
}

/// Coarse grouping of event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    System,
    Domain,
    Ui,
    Network,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::System => "system",
            EventCategory::Domain => "domain",
            EventCategory::Ui => "ui",
            EventCategory::Network => "network",
        }
    }
}

/// Closed set of event tags. The table is fixed at compile time; dynamic
/// registration is deliberately not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    // System
    StateChanged,
    ErrorOccurred,
    SettingsChanged,
    // Domain
    DataUpdated,
    FileProcessed,
    TaskCompleted,
    ResourceLoaded,
    // UI
    UiAction,
    ProgressUpdated,
    // Network
    NetworkStatus,
}

impl EventType {
    pub fn category(&self) -> EventCategory {
        match self {
            EventType::StateChanged | EventType::ErrorOccurred | EventType::SettingsChanged => {
                EventCategory::System
            }
            EventType::DataUpdated
            | EventType::FileProcessed
            | EventType::TaskCompleted
            | EventType::ResourceLoaded => EventCategory::Domain,
            EventType::UiAction | EventType::ProgressUpdated => EventCategory::Ui,
            EventType::NetworkStatus => EventCategory::Network,
        }
    }

    pub fn priority(&self) -> EventPriority {
        match self {
            EventType::ErrorOccurred => EventPriority::Critical,
            EventType::StateChanged | EventType::NetworkStatus => EventPriority::High,
            EventType::SettingsChanged
            | EventType::DataUpdated
            | EventType::FileProcessed
            | EventType::TaskCompleted
            | EventType::ResourceLoaded => EventPriority::Normal,
            EventType::UiAction | EventType::ProgressUpdated => EventPriority::Low,
        }
    }

    /// Qualified event name, e.g. `system:state_changed`
    pub fn name(&self) -> &'static str {
        match self {
            EventType::StateChanged => "system:state_changed",
            EventType::ErrorOccurred => "system:error_occurred",
            EventType::SettingsChanged => "system:settings_changed",
            EventType::DataUpdated => "domain:data_updated",
            EventType::FileProcessed => "domain:file_processed",
            EventType::TaskCompleted => "domain:task_completed",
            EventType::ResourceLoaded => "domain:resource_loaded",
            EventType::UiAction => "ui:ui_action",
            EventType::ProgressUpdated => "ui:progress_updated",
            EventType::NetworkStatus => "network:network_status",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An immutable notification routed to zero or more subscribers.
///
/// `source`, `timestamp`, and `id` are metadata only and never used for
/// routing. There is no mutating API: reinterpreting an event means
/// constructing a new one (see [`crate::events::refine_ui_action`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    event_type: EventType,
    data: EventData,
    source: Option<String>,
    timestamp: DateTime<Utc>,
    id: Uuid,
}

impl Event {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            data: EventData::new(),
            source: None,
            timestamp: Utc::now(),
            id: Uuid::new_v4(),
        }
    }

    /// Attach a payload field (builder style, consumed at construction)
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Tag the emitting component, e.g. `"ck.core.worker"`
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn priority(&self) -> EventPriority {
        self.event_type.priority()
    }

    pub fn data(&self) -> &EventData {
        &self.data
    }

    /// Look up a payload field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    // Contract constructors: the payload shape per event type lives here so
    // producers and consumers cannot drift apart.

    /// `STATE_CHANGED{old_state, new_state}`
    pub fn state_changed(old_state: ApplicationState, new_state: ApplicationState) -> Self {
        Event::new(EventType::StateChanged)
            .with_data("old_state", old_state.to_string())
            .with_data("new_state", new_state.to_string())
    }

    /// `ERROR_OCCURRED{error, context?}`
    pub fn error_occurred(error: impl Into<String>, context: Option<&ErrorContext>) -> Self {
        let mut event = Event::new(EventType::ErrorOccurred).with_data("error", error.into());
        if let Some(ctx) = context {
            if let Ok(value) = serde_json::to_value(ctx) {
                event = event.with_data("context", value);
            }
        }
        event
    }

    /// `TASK_COMPLETED{result, execution_time}`
    pub fn task_completed(result: Value, execution_time: f64) -> Self {
        Event::new(EventType::TaskCompleted)
            .with_data("result", result)
            .with_data("execution_time", execution_time)
    }

    /// `PROGRESS_UPDATED{progress, message}` with progress in -1..=100
    /// (-1 signals failure of the tracked task)
    pub fn progress(progress: i64, message: impl Into<String>) -> Self {
        Event::new(EventType::ProgressUpdated)
            .with_data("progress", progress.clamp(-1, 100))
            .with_data("message", message.into())
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
