//! Calendar event type.
//!
//! [`CalendarEvent`] is the provider-agnostic view of an event as far as
//! cleanup is concerned: an identifier to delete by and a title to group by.

use serde::{Deserialize, Serialize};

use crate::time::EventTime;
use crate::title::{TitleKey, normalize_title};

/// Title shown for events that have no summary at all.
pub const UNTITLED_DISPLAY: &str = "No Title";

/// A calendar event fetched from a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Provider-assigned identifier.
    pub id: String,
    /// Event title, if any.
    pub summary: Option<String>,
    /// Start time, when the provider reported one.
    pub start: Option<EventTime>,
    /// The calendar this event was listed from.
    pub calendar_id: String,
    /// Parent series for expanded recurring instances.
    pub recurring_event_id: Option<String>,
}

impl CalendarEvent {
    /// Creates a new event with the given identifier and calendar.
    pub fn new(id: impl Into<String>, calendar_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            summary: None,
            start: None,
            calendar_id: calendar_id.into(),
            recurring_event_id: None,
        }
    }

    /// Builder method to set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// The raw title for display, or `"No Title"` when the summary is absent.
    pub fn display_title(&self) -> &str {
        self.summary.as_deref().unwrap_or(UNTITLED_DISPLAY)
    }

    /// The grouping key derived from this event's summary.
    pub fn title_key(&self) -> TitleKey {
        normalize_title(self.summary.as_deref())
    }
}
