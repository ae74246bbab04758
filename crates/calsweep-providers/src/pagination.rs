//! Page-continuation loop for listing calls.
//!
//! Listing endpoints hand back one page of events plus an optional opaque
//! continuation token. [`collect_pages`] keeps asking for the next page until
//! no token comes back, accumulating events in order. It is generic over the
//! page fetcher so the loop itself can be exercised without a network.

use std::future::Future;

use calsweep_core::CalendarEvent;
use tracing::debug;

use crate::error::ProviderResult;
use crate::provider::{FetchResult, PageProgress};

/// One page of a listing.
#[derive(Debug, Default)]
pub struct EventPage {
    /// Events on this page, in listing order.
    pub items: Vec<CalendarEvent>,
    /// Token for the next page; `None` (or empty) on the last page.
    pub next_page_token: Option<String>,
}

/// Fetches pages until the continuation token runs out.
///
/// `fetch_page` receives `None` for the first page and the previous page's
/// token afterwards; `on_page` sees the running totals after every page. The
/// first error aborts the loop and is returned as-is.
pub async fn collect_pages<F, Fut, P>(
    mut fetch_page: F,
    mut on_page: P,
) -> ProviderResult<FetchResult>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = ProviderResult<EventPage>>,
    P: FnMut(PageProgress),
{
    let mut events = Vec::new();
    let mut pages = 0usize;
    let mut page_token: Option<String> = None;

    loop {
        let page = fetch_page(page_token.take()).await?;
        pages += 1;

        let page_len = page.items.len();
        events.extend(page.items);
        debug!(page = pages, page_len, total = events.len(), "fetched events page");
        on_page(PageProgress {
            pages,
            events: events.len(),
        });

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    Ok(FetchResult { events, pages })
}
