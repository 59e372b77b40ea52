// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! FIFO task queue drained by the single worker thread
//!
//! Blocking condvar queue with an optional capacity bound and a typed
//! shutdown sentinel. Strict FIFO: tasks execute in submission order because
//! there is exactly one consumer.

use crate::task::Task;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Returned by `push` when a bounded queue is at capacity; the task was not
/// enqueued and the caller must be told synchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("task queue is full (capacity {capacity})")]
pub struct QueueFull {
    pub capacity: usize,
}

/// An entry in the task queue
#[derive(Debug)]
pub enum QueueItem {
    Task(Task),
    /// Terminate-now marker pushed during shutdown, bypassing the bound
    Shutdown,
}

/// Bounded or unbounded FIFO of submitted tasks
#[derive(Debug)]
pub struct TaskQueue {
    items: Mutex<VecDeque<QueueItem>>,
    available: Condvar,
    capacity: Option<usize>,
}

impl TaskQueue {
    /// Create an unbounded queue
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
            capacity: None,
        }
    }

    /// Create a queue rejecting pushes beyond `capacity` pending tasks
    pub fn bounded(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
            capacity: Some(capacity),
        }
    }

    /// Enqueue a task, failing if the queue is at capacity
    pub fn push(&self, task: Task) -> Result<(), QueueFull> {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(capacity) = self.capacity {
            if items.len() >= capacity {
                return Err(QueueFull { capacity });
            }
        }
        items.push_back(QueueItem::Task(task));
        self.available.notify_one();
        Ok(())
    }

    /// Enqueue the shutdown sentinel. Not subject to the capacity bound so
    /// `stop()` can always unblock the worker.
    pub fn push_shutdown(&self) {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.push_back(QueueItem::Shutdown);
        self.available.notify_all();
    }

    /// Dequeue the next item, waiting up to `timeout`.
    ///
    /// Returns `None` on timeout so the worker can re-check its cancellation
    /// flag even when idle.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<QueueItem> {
        let deadline = Instant::now() + timeout;
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if let Some(item) = items.pop_front() {
                return Some(item);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, result) = self
                .available
                .wait_timeout(items, deadline - now)
                .unwrap_or_else(|e| e.into_inner());
            items = guard;
            if result.timed_out() {
                return items.pop_front();
            }
        }
    }

    /// Discard all pending tasks, returning how many were dropped
    pub fn clear(&self) -> usize {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        let dropped = items
            .iter()
            .filter(|item| matches!(item, QueueItem::Task(_)))
            .count();
        items.clear();
        dropped
    }

    /// Number of pending tasks (the shutdown sentinel is not counted)
    pub fn len(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|item| matches!(item, QueueItem::Task(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
