// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translation of generic UI-action events into typed actions
//!
//! UI frames publish a generic `UI_ACTION` event carrying an `action` string.
//! Translation is a pure function producing a typed tag and a fresh derived
//! event; the original event is never mutated, so subscribers of the generic
//! type still observe it unchanged.

use crate::event::{Event, EventType};

/// Operator actions available from the UI, as carried in the `action`
/// payload field of `UI_ACTION` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiAction {
    // JSON catalog operations
    ExtractAddresses,
    CheckCoordinates,
    ExtractBarcodes,
    WriteTestJson,
    // Image operations
    CompressImages,
    ConvertImageFormat,
    // Analysis operations
    CountUniqueOffers,
    ComparePrices,
    // Navigation
    NavigateHome,
    NavigateSettings,
    // Preferences
    UpdateTheme,
    UpdateLanguage,
}

impl UiAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UiAction::ExtractAddresses => "EXTRACT_ADDRESSES",
            UiAction::CheckCoordinates => "CHECK_COORDINATES",
            UiAction::ExtractBarcodes => "EXTRACT_BARCODES",
            UiAction::WriteTestJson => "WRITE_TEST_JSON",
            UiAction::CompressImages => "COMPRESS_IMAGES",
            UiAction::ConvertImageFormat => "CONVERT_IMAGE_FORMAT",
            UiAction::CountUniqueOffers => "COUNT_UNIQUE_OFFERS",
            UiAction::ComparePrices => "COMPARE_PRICES",
            UiAction::NavigateHome => "NAVIGATE_HOME",
            UiAction::NavigateSettings => "NAVIGATE_SETTINGS",
            UiAction::UpdateTheme => "UPDATE_THEME",
            UiAction::UpdateLanguage => "UPDATE_LANGUAGE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let action = match s {
            "EXTRACT_ADDRESSES" => UiAction::ExtractAddresses,
            "CHECK_COORDINATES" => UiAction::CheckCoordinates,
            "EXTRACT_BARCODES" => UiAction::ExtractBarcodes,
            "WRITE_TEST_JSON" => UiAction::WriteTestJson,
            "COMPRESS_IMAGES" => UiAction::CompressImages,
            "CONVERT_IMAGE_FORMAT" => UiAction::ConvertImageFormat,
            "COUNT_UNIQUE_OFFERS" => UiAction::CountUniqueOffers,
            "COMPARE_PRICES" => UiAction::ComparePrices,
            "NAVIGATE_HOME" => UiAction::NavigateHome,
            "NAVIGATE_SETTINGS" => UiAction::NavigateSettings,
            "UPDATE_THEME" => UiAction::UpdateTheme,
            "UPDATE_LANGUAGE" => UiAction::UpdateLanguage,
            _ => return None,
        };
        Some(action)
    }
}

impl std::fmt::Display for UiAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Refine a generic `UI_ACTION` event into a typed action plus a distinct
/// derived event (fresh id, canonical `action` field, payload and source
/// carried over).
///
/// Returns `None` for non-UI events, events without an `action` field, and
/// unknown action strings.
pub fn refine_ui_action(event: &Event) -> Option<(UiAction, Event)> {
    if event.event_type() != EventType::UiAction {
        return None;
    }
    let action = UiAction::parse(event.get("action")?.as_str()?)?;

    let mut derived = Event::new(EventType::UiAction).with_data("action", action.as_str());
    for (key, value) in event.data() {
        if key != "action" {
            derived = derived.with_data(key.clone(), value.clone());
        }
    }
    if let Some(source) = event.source() {
        derived = derived.with_source(source);
    }
    Some((action, derived))
}

#[cfg(test)]
#[path = "ui_tests.rs"]
mod tests;
