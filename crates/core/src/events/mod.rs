// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event routing for loose coupling between core, UI, and business logic
//!
//! This module provides:
//! - `EventBus` - priority-ordered pub/sub router with queued dispatch
//! - `EventHandler` - the capability subscribers implement
//! - `UiAction` / `refine_ui_action` - typed translation of UI actions

mod bus;
mod handler;
mod ui;

pub use bus::EventBus;
pub use handler::{EventHandler, HandlerError};
pub use ui::{refine_ui_action, UiAction};
