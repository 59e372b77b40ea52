// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bus: thread-safe pub/sub with priority-ordered, queued dispatch
//!
//! `publish` enqueues into a shared priority heap and a single drain loop
//! empties it, so events outstanding in the same burst are delivered in
//! global priority order across threads. Ties break on a monotonic sequence
//! counter assigned at enqueue time, never on wall-clock time.
//!
//! Lock discipline: no lock is ever held while a handler runs. A handler may
//! publish, subscribe, or unsubscribe without deadlocking; events it
//! publishes join the same heap and are drained by the outer loop.

use super::handler::{EventHandler, HandlerError};
use crate::event::{Event, EventType};
use std::cmp::Ordering as CmpOrdering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, warn};

type Subscribers = HashMap<EventType, Vec<Arc<dyn EventHandler>>>;
type ErrorSink = Arc<dyn Fn(&Event, &HandlerError) + Send + Sync>;

/// A pending event with its dispatch ordering key
struct QueuedEvent {
    event: Event,
    seq: u64,
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    /// Max-heap key: higher priority first, then FIFO by sequence
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.event
            .priority()
            .cmp(&other.event.priority())
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Process-wide pub/sub router.
///
/// Cloning shares state; construct one bus and hand clones to every
/// component that needs it. There is deliberately no global instance.
pub struct EventBus {
    subscribers: Arc<Mutex<Subscribers>>,
    pending: Arc<Mutex<BinaryHeap<QueuedEvent>>>,
    seq: Arc<AtomicU64>,
    draining: Arc<AtomicBool>,
    error_sink: Arc<Mutex<Option<ErrorSink>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            pending: Arc::new(Mutex::new(BinaryHeap::new())),
            seq: Arc::new(AtomicU64::new(0)),
            draining: Arc::new(AtomicBool::new(false)),
            error_sink: Arc::new(Mutex::new(None)),
        }
    }

    /// Register a handler for an event type.
    ///
    /// Returns false (no-op) if this exact handler is already registered for
    /// the type. Identity is the `Arc` pointer, so keep the `Arc` around to
    /// unsubscribe later.
    pub fn subscribe(&self, event_type: EventType, handler: Arc<dyn EventHandler>) -> bool {
        let mut subs = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        let entry = subs.entry(event_type).or_default();
        if entry.iter().any(|h| Arc::ptr_eq(h, &handler)) {
            warn!(event_type = %event_type, "handler already subscribed");
            return false;
        }
        entry.push(handler);
        debug!(event_type = %event_type, "handler subscribed");
        true
    }

    /// Remove a registration. Returns false if the handler was not
    /// subscribed for this type. The type entry is dropped entirely once its
    /// handler list becomes empty.
    pub fn unsubscribe(&self, event_type: EventType, handler: &Arc<dyn EventHandler>) -> bool {
        let mut subs = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        let Some(entry) = subs.get_mut(&event_type) else {
            warn!(event_type = %event_type, "unsubscribe from event type with no handlers");
            return false;
        };
        let before = entry.len();
        entry.retain(|h| !Arc::ptr_eq(h, handler));
        if entry.len() == before {
            warn!(event_type = %event_type, "unsubscribe of handler that was not subscribed");
            return false;
        }
        if entry.is_empty() {
            subs.remove(&event_type);
        }
        debug!(event_type = %event_type, "handler unsubscribed");
        true
    }

    /// Publish an event.
    ///
    /// The event joins the shared priority heap; if no drain loop is running
    /// on any thread, this call becomes the drain loop and returns once the
    /// heap is empty. If one is already running, the call returns immediately
    /// and that loop delivers the event.
    pub fn publish(&self, event: Event) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending.push(QueuedEvent { event, seq });
        }
        self.drain();
    }

    /// Install the process-wide sink invoked with `(event, error)` whenever a
    /// handler fails. Replaces any previous sink.
    pub fn set_error_handler(&self, sink: impl Fn(&Event, &HandlerError) + Send + Sync + 'static) {
        let mut slot = self.error_sink.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::new(sink));
        debug!("global error sink installed");
    }

    /// Count registered handlers, for one type or in total
    pub fn get_handlers_count(&self, event_type: Option<EventType>) -> usize {
        let subs = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        match event_type {
            Some(ty) => subs.get(&ty).map_or(0, Vec::len),
            None => subs.values().map(Vec::len).sum(),
        }
    }

    /// Drop every registration and the error sink. Primarily for test
    /// isolation.
    pub fn clear_all_handlers(&self) {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        *self.error_sink.lock().unwrap_or_else(|e| e.into_inner()) = None;
        debug!("all handlers cleared");
    }

    /// Single drain loop. Exactly one thread/frame holds the draining flag at
    /// a time; re-entrant publishes fall through immediately.
    fn drain(&self) {
        if self.draining.swap(true, Ordering::AcqRel) {
            return;
        }
        loop {
            loop {
                let next = {
                    let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
                    pending.pop()
                };
                match next {
                    Some(queued) => self.dispatch(&queued.event),
                    None => break,
                }
            }
            self.draining.store(false, Ordering::Release);
            // An event may have been enqueued between the last pop and
            // clearing the flag; reclaim the flag or leave it to that
            // publisher's own drain call.
            let has_pending = !self
                .pending
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .is_empty();
            if !has_pending || self.draining.swap(true, Ordering::AcqRel) {
                break;
            }
        }
    }

    /// Deliver one event to a snapshot of its handlers, in subscription
    /// order. The snapshot is taken and the lock released before any handler
    /// runs.
    fn dispatch(&self, event: &Event) {
        let handlers = {
            let subs = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
            subs.get(&event.event_type()).cloned().unwrap_or_default()
        };
        if handlers.is_empty() {
            return;
        }
        let sink = self
            .error_sink
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for handler in handlers {
            if let Err(err) = handler.handle(event) {
                error!(
                    event_type = %event.event_type(),
                    error = %err,
                    "event handler failed"
                );
                if let Some(sink) = sink.as_ref() {
                    sink(event, &err);
                }
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
            pending: Arc::clone(&self.pending),
            seq: Arc::clone(&self.seq),
            draining: Arc::clone(&self.draining),
            error_sink: Arc::clone(&self.error_sink),
        }
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
