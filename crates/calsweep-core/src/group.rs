//! Grouping of events by normalized title.
//!
//! [`group_events`] walks the fetched events once, in order, and appends each
//! one to the [`EventGroup`] for its [`TitleKey`]. Groups come out in the
//! order their key was first seen, so reviewing the same fetch twice presents
//! the same sequence.

use std::collections::HashMap;

use serde::Serialize;

use crate::event::CalendarEvent;
use crate::title::TitleKey;

/// Events sharing one title key, in the order they were fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventGroup {
    key: TitleKey,
    events: Vec<CalendarEvent>,
}

impl EventGroup {
    fn new(key: TitleKey) -> Self {
        Self {
            key,
            events: Vec::new(),
        }
    }

    /// The shared title key.
    pub fn key(&self) -> &TitleKey {
        &self.key
    }

    /// Member events, first-fetched first.
    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    /// Number of member events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Groups are created on their first member, so this is only true for
    /// a group that was never populated.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The first member's raw title, used as the group's example.
    pub fn example_title(&self) -> Option<&str> {
        self.events.first().map(CalendarEvent::display_title)
    }
}

/// Ordered mapping from title key to group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GroupedEvents {
    groups: Vec<EventGroup>,
    #[serde(skip)]
    index: HashMap<TitleKey, usize>,
}

impl GroupedEvents {
    /// Creates an empty grouping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event to the group for its key, creating the group if the
    /// key has not been seen yet.
    pub fn push(&mut self, event: CalendarEvent) {
        let key = event.title_key();
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.groups.len();
                self.index.insert(key.clone(), slot);
                self.groups.push(EventGroup::new(key));
                slot
            }
        };
        self.groups[slot].events.push(event);
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if no events were grouped.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of events across all groups.
    pub fn total_events(&self) -> usize {
        self.groups.iter().map(EventGroup::len).sum()
    }

    /// Looks up the group for a key.
    pub fn get(&self, key: &str) -> Option<&EventGroup> {
        self.index.get(key).map(|&slot| &self.groups[slot])
    }

    /// Iterates over groups in first-appearance order.
    pub fn iter(&self) -> std::slice::Iter<'_, EventGroup> {
        self.groups.iter()
    }
}

impl<'a> IntoIterator for &'a GroupedEvents {
    type Item = &'a EventGroup;
    type IntoIter = std::slice::Iter<'a, EventGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<CalendarEvent> for GroupedEvents {
    fn from_iter<I: IntoIterator<Item = CalendarEvent>>(iter: I) -> Self {
        let mut grouped = Self::new();
        for event in iter {
            grouped.push(event);
        }
        grouped
    }
}

/// Partitions events by normalized title, preserving fetch order.
pub fn group_events(events: impl IntoIterator<Item = CalendarEvent>) -> GroupedEvents {
    events.into_iter().collect()
}
