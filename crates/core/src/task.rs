// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tasks: opaque units of deferred work, plus the cooperative cancel token
//!
//! A task is a zero-argument, possibly-failing closure supplied by business
//! logic (JSON extraction, image conversion, plotting). The core never looks
//! inside; it only owns the task from submission until execution and forwards
//! the outcome through events.

use crate::error::TaskError;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of a task body
pub type TaskResult = Result<Value, TaskError>;

type TaskFn = Box<dyn FnOnce() -> TaskResult + Send>;

/// A unit of background work.
///
/// Ownership: created by a caller, exclusively owned by the queue until
/// dequeued, then by the worker for the duration of execution. The result is
/// forwarded via `TASK_COMPLETED` / `ERROR_OCCURRED`, never retained.
pub struct Task {
    func: TaskFn,
    description: String,
    track_progress: bool,
}

impl Task {
    pub fn new(func: impl FnOnce() -> TaskResult + Send + 'static) -> Self {
        Self {
            func: Box::new(func),
            description: String::new(),
            track_progress: true,
        }
    }

    /// Human-readable label used in progress messages and logs
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Suppress the 0%/100%/-1% `PROGRESS_UPDATED` events around execution
    pub fn without_progress(mut self) -> Self {
        self.track_progress = false;
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn track_progress(&self) -> bool {
        self.track_progress
    }

    /// Execute the task body, consuming the task
    pub fn run(self) -> TaskResult {
        (self.func)()
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("description", &self.description)
            .field("track_progress", &self.track_progress)
            .finish_non_exhaustive()
    }
}

/// Shared flag for cooperative cancellation.
///
/// The worker polls it at loop-top and immediately before each task; long
/// tasks are expected to poll it themselves and return
/// [`TaskError::Cancelled`]. A task that never polls simply keeps running
/// detached after `stop()` returns - it is never forcibly killed.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
