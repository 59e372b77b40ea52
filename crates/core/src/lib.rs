// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ck-core: application core for the Catalog Kit (ck) desktop utility
//!
//! This crate provides:
//! - A priority-ordered publish/subscribe event bus
//! - A supervised background task engine with one worker thread
//! - An application state machine with transition history
//! - Error context plumbing and lifecycle metrics
//!
//! UI frames, codecs, and business transforms live outside this crate.
//! They interact with the core only as opaque tasks (`Task`) submitted
//! for execution and as subscribers (`EventHandler`) reacting to events.

pub mod clock;

pub mod events;

pub mod app;
pub mod error;
pub mod event;
pub mod metrics;
pub mod queue;
pub mod state;
pub mod task;

// Re-exports
pub use app::{ApplicationCore, CoreConfig};
pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{CoreError, ErrorContext, ErrorSeverity, TaskError};
pub use event::{Event, EventCategory, EventData, EventPriority, EventType};
pub use events::{EventBus, EventHandler, HandlerError, UiAction};
pub use metrics::{Metrics, MetricsSnapshot};
pub use queue::{QueueFull, QueueItem, TaskQueue};
pub use state::{ApplicationState, StateManager};
pub use task::{CancelToken, Task, TaskResult};
