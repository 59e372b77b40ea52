// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle performance counters with best-effort JSON persistence
//!
//! An explicit component owned by the application core, started and stopped
//! with it. On `stop()` the core writes a snapshot under the per-user data
//! directory; a failed write is logged and swallowed, never raised.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Point-in-time view of the counters, as persisted
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub started_at: DateTime<Utc>,
    pub captured_at: DateTime<Utc>,
    pub uptime_secs: f64,
    pub tasks_submitted: u64,
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub errors_reported: u64,
}

/// Task and error counters for one core lifecycle
#[derive(Debug)]
pub struct Metrics {
    started_at: DateTime<Utc>,
    started: Instant,
    tasks_submitted: AtomicU64,
    tasks_completed: AtomicU64,
    tasks_failed: AtomicU64,
    errors_reported: AtomicU64,
}

impl Metrics {
    /// `started` comes from the core's clock so uptime is testable
    pub fn new(started: Instant) -> Self {
        Self {
            started_at: Utc::now(),
            started,
            tasks_submitted: AtomicU64::new(0),
            tasks_completed: AtomicU64::new(0),
            tasks_failed: AtomicU64::new(0),
            errors_reported: AtomicU64::new(0),
        }
    }

    pub fn record_submitted(&self) {
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completed(&self) {
        self.tasks_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.tasks_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error_reported(&self) {
        self.errors_reported.fetch_add(1, Ordering::Relaxed);
    }

    /// Capture the counters; `now` comes from the same clock as `started`
    pub fn snapshot(&self, now: Instant) -> MetricsSnapshot {
        MetricsSnapshot {
            started_at: self.started_at,
            captured_at: Utc::now(),
            uptime_secs: now.saturating_duration_since(self.started).as_secs_f64(),
            tasks_submitted: self.tasks_submitted.load(Ordering::Relaxed),
            tasks_completed: self.tasks_completed.load(Ordering::Relaxed),
            tasks_failed: self.tasks_failed.load(Ordering::Relaxed),
            errors_reported: self.errors_reported.load(Ordering::Relaxed),
        }
    }

    /// Write a snapshot as pretty JSON, creating parent directories
    pub fn persist(&self, path: &Path, now: Instant) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let snapshot = self.snapshot(now);
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }

    /// Default location under the per-user data directory
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::data_dir()?.join("ck").join("metrics.json"))
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
