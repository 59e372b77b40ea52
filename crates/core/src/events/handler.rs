// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscriber capability consumed by the event bus

use crate::event::Event;

/// Error surfaced by a failing handler; isolated per handler, never
/// propagated to other subscribers or the publisher.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Capability implemented by everything that reacts to events: UI frames,
/// error routers, loggers. The bus holds handlers as `Arc<dyn EventHandler>`
/// and identifies registrations by pointer.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &Event) -> Result<(), HandlerError>;
}

/// Plain closures subscribe directly
impl<F> EventHandler for F
where
    F: Fn(&Event) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        self(event)
    }
}
