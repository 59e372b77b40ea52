// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types and the error-context value passed across the task boundary

use crate::queue::QueueFull;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Opaque failure carried out of a task body
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a single task execution.
///
/// `Cancelled` is the cancellation-class variant: a task that observes the
/// core's [`crate::task::CancelToken`] during shutdown returns it, and the
/// worker loop exits instead of transitioning to the ERROR state.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task cancelled")]
    Cancelled,
    #[error(transparent)]
    Failed(#[from] BoxError),
}

impl TaskError {
    /// Wrap a plain message as a task failure
    pub fn failed(message: impl Into<String>) -> Self {
        TaskError::Failed(message.into().into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskError::Cancelled)
    }
}

/// Errors surfaced synchronously by the application core
#[derive(Debug, Error)]
pub enum CoreError {
    /// `add_task` called after shutdown was initiated
    #[error("core is shutting down, task rejected")]
    ShuttingDown,
    /// Bounded task queue is at capacity; the task was not enqueued
    #[error(transparent)]
    QueueFull(#[from] QueueFull),
    /// Failure of a synchronously executed task (`handle_task`)
    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Severity classification for reported failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorSeverity::Info => "INFO",
            ErrorSeverity::Warning => "WARNING",
            ErrorSeverity::Error => "ERROR",
            ErrorSeverity::Critical => "CRITICAL",
        };
        write!(f, "{}", s)
    }
}

/// Structured context attached to a reported failure.
///
/// Serialized into the `context` field of `ERROR_OCCURRED` events so
/// subscribers can render the operation, details, and recovery hint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorContext {
    pub operation: String,
    pub details: serde_json::Map<String, Value>,
    pub severity: ErrorSeverity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_action: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>, severity: ErrorSeverity) -> Self {
        Self {
            operation: operation.into(),
            details: serde_json::Map::new(),
            severity,
            recovery_action: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn with_recovery(mut self, action: impl Into<String>) -> Self {
        self.recovery_action = Some(action.into());
        self
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
