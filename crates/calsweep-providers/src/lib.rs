//! CalendarProvider trait and the Google Calendar backend.
//!
//! - [`CalendarProvider`] - the seam between cleanup logic and a calendar
//! - [`collect_pages`] - the continuation-token loop behind every listing
//! - [`google::GoogleProvider`] - OAuth, listing and deletion against Google
//! - [`ProviderError`] - error types for provider operations
//!
//! # Example
//!
//! ```ignore
//! use calsweep_providers::{CalendarProvider, FetchOptions};
//!
//! async fn count(provider: &dyn CalendarProvider, window: TimeWindow) -> usize {
//!     let result = provider.fetch_events(FetchOptions::new("primary", window)).await?;
//!     result.events.len()
//! }
//! ```

pub mod error;
pub mod google;
pub mod pagination;
pub mod provider;

pub use error::{ProviderError, ProviderErrorKind, ProviderResult, Stage};
pub use pagination::{EventPage, collect_pages};
pub use provider::{BoxFuture, CalendarProvider, FetchOptions, FetchResult, OnPage, PageProgress};
