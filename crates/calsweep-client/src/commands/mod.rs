//! Subcommand implementations.

pub mod auth;
pub mod config;
pub mod groups;
pub mod sweep;

use calsweep_core::{GroupedEvents, group_events};
use calsweep_providers::{CalendarProvider, OnPage};
use calsweep_providers::google::GoogleProvider;
use tracing::info;

use crate::config::{GoogleSettings, SweepTarget};
use crate::error::ClientResult;

/// Builds the Google provider and makes sure it holds usable credentials.
pub async fn connect(settings: &GoogleSettings) -> ClientResult<GoogleProvider> {
    let provider = GoogleProvider::new(settings.to_provider_config()?)?;
    let outcome = provider.authorize(false).await?;
    info!("google: {}", outcome);
    Ok(provider)
}

/// Events fetched for a target, already grouped.
#[derive(Debug)]
pub struct FetchedGroups {
    /// Grouping in first-appearance order.
    pub groups: GroupedEvents,
    /// Number of events listed.
    pub total_events: usize,
    /// Number of listing pages.
    pub pages: usize,
}

/// Lists every event in the target window and groups them by title.
///
/// `on_page` sees the running totals after each listing page.
pub async fn fetch_groups(
    provider: &dyn CalendarProvider,
    target: &SweepTarget,
    on_page: OnPage<'_>,
) -> ClientResult<FetchedGroups> {
    let result = provider
        .fetch_events_with_progress(target.fetch_options()?, on_page)
        .await?;
    let groups = group_events(result.events);
    let total_events = groups.total_events();

    info!(
        events = total_events,
        pages = result.pages,
        groups = groups.len(),
        "fetched and grouped events"
    );
    Ok(FetchedGroups {
        groups,
        total_events,
        pages: result.pages,
    })
}
