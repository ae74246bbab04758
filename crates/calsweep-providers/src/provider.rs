//! CalendarProvider trait definition.
//!
//! This module defines the [`CalendarProvider`] trait, the narrow seam between
//! the cleanup logic and a calendar backend. A provider lists every event in a
//! window (paginating internally) and deletes single events by id.

use std::future::Future;
use std::pin::Pin;

use calsweep_core::{CalendarEvent, TimeWindow};

use crate::error::ProviderResult;

/// Result from fetching events.
#[derive(Debug, Default)]
pub struct FetchResult {
    /// The fetched events, in the order the provider returned them.
    pub events: Vec<CalendarEvent>,
    /// Number of pages the listing took.
    pub pages: usize,
}

/// Running totals reported after each listing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageProgress {
    /// Pages fetched so far.
    pub pages: usize,
    /// Events accumulated so far.
    pub events: usize,
}

/// Callback handed each [`PageProgress`] while a listing runs.
pub type OnPage<'a> = &'a mut (dyn FnMut(PageProgress) + Send);

/// Options for listing events.
///
/// Recurring events are always expanded into instances, ordered by start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Calendar to list from.
    pub calendar_id: String,
    /// Time window to fetch events for.
    pub time_window: TimeWindow,
    /// Page size hint for the provider.
    pub page_size: Option<usize>,
}

impl FetchOptions {
    /// Creates options for the given calendar and window.
    pub fn new(calendar_id: impl Into<String>, time_window: TimeWindow) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            time_window,
            page_size: None,
        }
    }

    /// Builder method to set the page size hint.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }
}

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe so callers can hold a
/// `&dyn CalendarProvider`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The core abstraction for calendar providers.
///
/// # Implementation Notes
///
/// - `fetch_events_with_progress` must follow continuation tokens until the
///   listing is exhausted, report every page to `on_page` and return events
///   in listing order
/// - `delete_event` issues exactly one delete request; callers decide what a
///   failure means
/// - Authentication state is managed internally
pub trait CalendarProvider: Send + Sync {
    /// Returns the name/type of this provider (e.g., "google").
    fn name(&self) -> &str;

    /// Fetches every event in the options' window, calling `on_page` after
    /// each page.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on network errors, authentication failures, etc.
    fn fetch_events_with_progress<'a>(
        &'a self,
        options: FetchOptions,
        on_page: OnPage<'a>,
    ) -> BoxFuture<'a, ProviderResult<FetchResult>>;

    /// Fetches every event in the options' window.
    fn fetch_events(&self, options: FetchOptions) -> BoxFuture<'_, ProviderResult<FetchResult>> {
        Box::pin(async move {
            self.fetch_events_with_progress(options, &mut |_: PageProgress| {})
                .await
        })
    }

    /// Deletes one event.
    fn delete_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Checks if the provider currently holds usable credentials.
    fn is_authenticated(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_options_defaults() {
        let window = TimeWindow::for_year(2026).unwrap();
        let options = FetchOptions::new("primary", window.clone());

        assert_eq!(options.calendar_id, "primary");
        assert_eq!(options.time_window, window);
        assert!(options.page_size.is_none());
    }

    #[test]
    fn fetch_options_builder() {
        let window = TimeWindow::for_year(2026).unwrap();
        let options = FetchOptions::new("work@example.com", window).with_page_size(250);

        assert_eq!(options.page_size, Some(250));
    }

    #[tokio::test]
    async fn plain_fetch_ignores_progress() {
        struct TwoPages;

        impl CalendarProvider for TwoPages {
            fn name(&self) -> &str {
                "two-pages"
            }

            fn fetch_events_with_progress<'a>(
                &'a self,
                _options: FetchOptions,
                on_page: OnPage<'a>,
            ) -> BoxFuture<'a, ProviderResult<FetchResult>> {
                Box::pin(async move {
                    on_page(PageProgress { pages: 1, events: 1 });
                    on_page(PageProgress { pages: 2, events: 2 });
                    Ok(FetchResult {
                        events: vec![
                            CalendarEvent::new("evt-1", "primary"),
                            CalendarEvent::new("evt-2", "primary"),
                        ],
                        pages: 2,
                    })
                })
            }

            fn delete_event<'a>(
                &'a self,
                _calendar_id: &'a str,
                _event_id: &'a str,
            ) -> BoxFuture<'a, ProviderResult<()>> {
                Box::pin(async { Ok(()) })
            }

            fn is_authenticated(&self) -> bool {
                true
            }
        }

        let window = TimeWindow::for_year(2026).unwrap();
        let result = TwoPages
            .fetch_events(FetchOptions::new("primary", window))
            .await
            .unwrap();
        assert_eq!(result.events.len(), 2);
        assert_eq!(result.pages, 2);
    }
}
