//! Core types: events, time window, title normalization, grouping

pub mod event;
pub mod group;
pub mod time;
pub mod title;
pub mod tracing;

pub use event::CalendarEvent;
pub use group::{EventGroup, GroupedEvents, group_events};
pub use time::{EventTime, TimeWindow};
pub use title::{NO_TITLE_KEY, TitleKey, normalize_title};
pub use tracing::{TracingConfig, TracingError, init_tracing};
