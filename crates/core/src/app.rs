// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Application core: task queue, worker thread, state manager, error queue
//!
//! Composition root of the subsystem. A caller (the UI thread) submits tasks
//! via `add_task`; exactly one background worker drains the queue and
//! publishes outcomes as events. The UI thread periodically calls
//! `process_background_tasks` to surface worker-side errors and reconcile
//! the application state without touching worker internals.
//!
//! Shutdown is cooperative only: `stop()` flags the cancel token, drains the
//! queue, pushes a sentinel, and joins the worker within a bounded timeout.
//! A worker stuck in a non-cooperating task is left detached with a warning,
//! never killed.

use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, ErrorContext, ErrorSeverity, TaskError};
use crate::event::Event;
use crate::events::EventBus;
use crate::metrics::Metrics;
use crate::queue::{QueueItem, TaskQueue};
use crate::state::{ApplicationState, StateManager};
use crate::task::{CancelToken, Task};
use serde_json::Value;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Tunables for the core lifecycle
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Maximum pending tasks; `None` for an unbounded queue
    pub queue_capacity: Option<usize>,
    /// How long the worker blocks on an empty queue before re-checking the
    /// cancel flag
    pub poll_interval: Duration,
    /// How long `stop()` waits for the worker before detaching it
    pub join_timeout: Duration,
    /// Where to persist metrics on `stop()`; `None` falls back to the
    /// per-user data directory
    pub metrics_path: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            queue_capacity: None,
            poll_interval: Duration::from_millis(500),
            join_timeout: Duration::from_secs(2),
            metrics_path: None,
        }
    }
}

/// A task failure captured on the worker thread, awaiting the UI-thread poll
struct BackgroundError {
    message: String,
    context: ErrorContext,
}

/// State shared between the owning thread and the worker
struct Shared<C: Clock> {
    bus: EventBus,
    queue: TaskQueue,
    errors: Mutex<VecDeque<BackgroundError>>,
    state: StateManager,
    cancel: CancelToken,
    metrics: Metrics,
    shutting_down: AtomicBool,
    clock: C,
    poll_interval: Duration,
}

impl<C: Clock> Shared<C> {
    /// Log, queue for the UI-thread poll, and publish `ERROR_OCCURRED`
    fn report_error(&self, message: String, context: ErrorContext) {
        error!(error = %message, operation = %context.operation, "task error");
        self.metrics.record_error_reported();
        let event = Event::error_occurred(message.clone(), Some(&context)).with_source("ck.core");
        {
            let mut errors = self.errors.lock().unwrap_or_else(|e| e.into_inner());
            errors.push_back(BackgroundError { message, context });
        }
        self.bus.publish(event);
    }

    /// Execute one task with the progress-event contract: 0% before, 100%
    /// after, -1% on failure (unless progress tracking is off or the task
    /// was cancelled).
    fn run_task(&self, task: Task) -> Result<(Value, f64), TaskError> {
        let description = task.description().to_string();
        let track = task.track_progress();
        if track {
            self.bus
                .publish(Event::progress(0, format!("Starting {}...", description)));
        }
        let started = self.clock.now();
        match task.run() {
            Ok(value) => {
                if track {
                    self.bus
                        .publish(Event::progress(100, format!("{} finished", description)));
                }
                Ok((value, self.clock.elapsed(started).as_secs_f64()))
            }
            Err(err) => {
                if track && !err.is_cancelled() {
                    self.bus
                        .publish(Event::progress(-1, format!("Error: {}", err)));
                }
                Err(err)
            }
        }
    }
}

/// The application core. Owns the worker thread and exposes the
/// task-submission API and the start/stop lifecycle.
pub struct ApplicationCore<C: Clock = SystemClock> {
    shared: Arc<Shared<C>>,
    config: CoreConfig,
    worker: Mutex<Option<JoinHandle<()>>>,
    running: AtomicBool,
}

impl ApplicationCore {
    pub fn new(bus: EventBus) -> Self {
        Self::with_config(bus, CoreConfig::default())
    }

    pub fn with_config(bus: EventBus, config: CoreConfig) -> Self {
        Self::with_clock(bus, config, SystemClock)
    }
}

impl<C: Clock + 'static> ApplicationCore<C> {
    pub fn with_clock(bus: EventBus, config: CoreConfig, clock: C) -> Self {
        let queue = config
            .queue_capacity
            .map_or_else(TaskQueue::new, TaskQueue::bounded);
        let started = clock.now();
        let shared = Arc::new(Shared {
            bus: bus.clone(),
            queue,
            errors: Mutex::new(VecDeque::new()),
            state: StateManager::new(bus),
            cancel: CancelToken::new(),
            metrics: Metrics::new(started),
            shutting_down: AtomicBool::new(false),
            clock,
            poll_interval: config.poll_interval,
        });
        Self {
            shared,
            config,
            worker: Mutex::new(None),
            running: AtomicBool::new(false),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.shared.bus
    }

    pub fn state_manager(&self) -> &StateManager {
        &self.shared.state
    }

    /// Current application state snapshot
    pub fn state(&self) -> ApplicationState {
        self.shared.state.state()
    }

    /// Clone of the cancel flag for long tasks to poll
    pub fn cancel_token(&self) -> CancelToken {
        self.shared.cancel.clone()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.shared.metrics
    }

    /// Spawn the worker thread. Idempotent: a second call warns and returns
    /// without spawning another worker.
    pub fn start(&self) {
        if self.shared.shutting_down.load(Ordering::SeqCst) {
            warn!("start ignored, core has been shut down");
            return;
        }
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("start ignored, worker already running");
            return;
        }
        self.shared.state.update_state(ApplicationState::Ready);
        self.shared.state.update_state(ApplicationState::Idle);

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("ck-core-worker".to_string())
            .spawn(move || worker_loop(shared));
        match spawned {
            Ok(handle) => {
                let mut worker = self.worker.lock().unwrap_or_else(|e| e.into_inner());
                *worker = Some(handle);
                info!("background worker started");
            }
            Err(err) => {
                self.running.store(false, Ordering::SeqCst);
                error!(error = %err, "failed to spawn worker thread");
            }
        }
    }

    /// Enqueue a task for the background worker.
    ///
    /// Rejected once shutdown has been initiated, or when a bounded queue is
    /// full. On success the state flips IDLE -> PROCESSING synchronously, so
    /// the caller never observes a stale IDLE before the worker wakes.
    pub fn add_task(&self, task: Task) -> Result<(), CoreError> {
        if self.shared.shutting_down.load(Ordering::SeqCst) {
            return Err(CoreError::ShuttingDown);
        }
        debug!(description = %task.description(), "task submitted");
        self.shared.queue.push(task)?;
        self.shared.metrics.record_submitted();
        if self.shared.state.state() == ApplicationState::Idle {
            self.shared.state.update_state(ApplicationState::Processing);
        }
        Ok(())
    }

    /// Run a task synchronously on the caller's thread.
    ///
    /// Same progress and state contract as the background path; the result
    /// is returned directly in addition to the `TASK_COMPLETED` event. State
    /// is restored to IDLE afterwards unless the task left it in ERROR.
    pub fn handle_task(&self, task: Task) -> Result<Value, CoreError> {
        self.shared.state.update_state(ApplicationState::Processing);
        let outcome = self.shared.run_task(task);
        let result = match outcome {
            Ok((value, execution_time)) => {
                self.shared.metrics.record_completed();
                self.shared
                    .bus
                    .publish(Event::task_completed(value.clone(), execution_time));
                Ok(value)
            }
            Err(err) => {
                self.shared.metrics.record_failed();
                let context = ErrorContext::new("synchronous task", ErrorSeverity::Error)
                    .with_detail("error", err.to_string());
                self.shared
                    .bus
                    .publish(Event::error_occurred(err.to_string(), Some(&context)));
                self.shared.state.update_state(ApplicationState::Error);
                Err(CoreError::Task(err))
            }
        };
        if self.shared.state.state() != ApplicationState::Error {
            self.shared.state.update_state(ApplicationState::Idle);
        }
        result
    }

    /// Report a failure on behalf of a collaborator: logged, queued for the
    /// UI-thread poll, and published as `ERROR_OCCURRED`.
    pub fn handle_error(&self, err: impl std::fmt::Display, context: ErrorContext) {
        self.shared.report_error(err.to_string(), context);
    }

    /// UI-thread poll: drain the error queue and reconcile PROCESSING/IDLE
    /// with the actual queue contents.
    pub fn process_background_tasks(&self) {
        let drained: Vec<BackgroundError> = {
            let mut errors = self.shared.errors.lock().unwrap_or_else(|e| e.into_inner());
            errors.drain(..).collect()
        };
        for err in drained {
            warn!(error = %err.message, "background error surfaced to UI thread");
            self.shared
                .bus
                .publish(Event::error_occurred(err.message, Some(&err.context)));
        }

        let queue_empty = self.shared.queue.is_empty();
        let state = self.shared.state.state();
        if !queue_empty && state != ApplicationState::Processing {
            self.shared.state.update_state(ApplicationState::Processing);
        } else if queue_empty && state == ApplicationState::Processing {
            self.shared.state.update_state(ApplicationState::Idle);
        }
    }

    /// Graceful shutdown: reject new tasks, cancel cooperatively, discard
    /// not-yet-started tasks, wake the worker with a sentinel, and join it
    /// within `join_timeout`. Safe no-op when already stopped.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            debug!("stop ignored, core not running");
            return;
        }
        info!("stopping background worker");
        self.shared.shutting_down.store(true, Ordering::SeqCst);
        self.shared
            .state
            .update_state(ApplicationState::ShuttingDown);
        self.shared.cancel.cancel();

        let dropped = self.shared.queue.clear();
        if dropped > 0 {
            warn!(dropped, "discarding queued tasks on shutdown");
        }
        self.shared.queue.push_shutdown();

        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            // Wall-clock bound: the join must terminate even under FakeClock
            let deadline = Instant::now() + self.config.join_timeout;
            while !handle.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(10));
            }
            if handle.is_finished() {
                if handle.join().is_err() {
                    error!("worker thread panicked");
                }
                info!("background worker stopped");
            } else {
                // Last resort: the thread keeps running detached. It holds no
                // locks and will observe the cancel flag at its next poll.
                warn!(
                    timeout_ms = self.config.join_timeout.as_millis() as u64,
                    "worker did not exit in time, leaving it detached"
                );
            }
        }

        let path = self.config.metrics_path.clone().or_else(Metrics::default_path);
        if let Some(path) = path {
            if let Err(err) = self.shared.metrics.persist(&path, self.shared.clock.now()) {
                warn!(error = %err, path = %path.display(), "failed to persist metrics");
            }
        }
    }
}

/// Drain loop run by the single worker thread
fn worker_loop<C: Clock>(shared: Arc<Shared<C>>) {
    info!("worker loop entered");
    loop {
        if shared.cancel.is_cancelled() {
            info!("cancellation requested, worker exiting");
            break;
        }
        let item = match shared.queue.pop_timeout(shared.poll_interval) {
            Some(item) => item,
            None => continue,
        };
        match item {
            QueueItem::Shutdown => {
                info!("shutdown sentinel received");
                break;
            }
            QueueItem::Task(task) => {
                shared.state.update_state(ApplicationState::Processing);
                // stop() may have raced in between dequeue and execution
                if shared.cancel.is_cancelled() {
                    info!("cancellation raced with dequeue, skipping task");
                    break;
                }
                let description = task.description().to_string();
                match shared.run_task(task) {
                    Ok((result, execution_time)) => {
                        shared.metrics.record_completed();
                        debug!(description = %description, execution_time, "task completed");
                        shared.bus.publish(
                            Event::task_completed(result, execution_time)
                                .with_source("ck.core.worker"),
                        );
                    }
                    Err(TaskError::Cancelled) => {
                        info!(description = %description, "task cancelled, worker exiting");
                        break;
                    }
                    Err(err) => {
                        shared.metrics.record_failed();
                        let context = ErrorContext::new("background task", ErrorSeverity::Error)
                            .with_detail("description", description.clone())
                            .with_detail("error", err.to_string());
                        shared.report_error(err.to_string(), context);
                        shared.state.update_state(ApplicationState::Error);
                    }
                }
                if shared.queue.is_empty()
                    && !shared.cancel.is_cancelled()
                    && shared.state.state() != ApplicationState::Error
                {
                    shared.state.update_state(ApplicationState::Idle);
                }
            }
        }
    }
    info!("worker loop exited");
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
