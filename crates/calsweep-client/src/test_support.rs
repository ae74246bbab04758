//! In-memory stand-ins for the calendar and the operator.

use std::collections::{HashSet, VecDeque};
use std::io;
use std::sync::Mutex;

use calsweep_core::CalendarEvent;
use calsweep_providers::{
    BoxFuture, CalendarProvider, FetchOptions, FetchResult, OnPage, PageProgress, ProviderError,
    ProviderResult,
};

use crate::prompt::{Decision, DecisionSource};

/// Replays canned answers; quits once they run out.
#[derive(Debug, Default)]
pub struct ScriptedDecisions {
    answers: VecDeque<Decision>,
    prompts: Vec<String>,
}

impl ScriptedDecisions {
    pub fn new(answers: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl DecisionSource for ScriptedDecisions {
    fn decide(&mut self, prompt: &str) -> io::Result<Decision> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front().unwrap_or(Decision::Quit))
    }
}

/// A calendar held in memory that records delete calls.
#[derive(Default)]
pub struct StubProvider {
    events: Vec<CalendarEvent>,
    failing_ids: HashSet<String>,
    gone_ids: HashSet<String>,
    page_len: Option<usize>,
    fetch_error: Mutex<Option<ProviderError>>,
    fetch_options: Mutex<Vec<FetchOptions>>,
    delete_calls: Mutex<Vec<(String, String)>>,
}

impl StubProvider {
    pub fn with_titles(titles: &[&str]) -> Self {
        let events = titles
            .iter()
            .enumerate()
            .map(|(i, title)| CalendarEvent::new(format!("evt-{}", i + 1), "primary").with_summary(*title))
            .collect();
        Self::with_events(events)
    }

    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    /// Makes deletes of `id` fail.
    pub fn failing(mut self, id: &str) -> Self {
        self.failing_ids.insert(id.to_string());
        self
    }

    /// Serves the listing `len` events per page.
    pub fn paged(mut self, len: usize) -> Self {
        self.page_len = Some(len);
        self
    }

    /// Makes deletes of `id` report the event as already deleted.
    pub fn gone(mut self, id: &str) -> Self {
        self.gone_ids.insert(id.to_string());
        self
    }

    /// Makes the next fetch fail.
    pub fn fetch_fails(self, error: ProviderError) -> Self {
        *self.fetch_error.lock().unwrap() = Some(error);
        self
    }

    pub fn events_snapshot(&self) -> Vec<CalendarEvent> {
        self.events.clone()
    }

    pub fn fetch_options(&self) -> Vec<FetchOptions> {
        self.fetch_options.lock().unwrap().clone()
    }

    /// Event ids passed to `delete_event`, in call order.
    pub fn deleted_ids(&self) -> Vec<String> {
        self.delete_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, id)| id.clone())
            .collect()
    }

    pub fn delete_calls(&self) -> Vec<(String, String)> {
        self.delete_calls.lock().unwrap().clone()
    }
}

impl CalendarProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn fetch_events_with_progress<'a>(
        &'a self,
        options: FetchOptions,
        on_page: OnPage<'a>,
    ) -> BoxFuture<'a, ProviderResult<FetchResult>> {
        self.fetch_options.lock().unwrap().push(options);
        if let Some(err) = self.fetch_error.lock().unwrap().take() {
            return Box::pin(async move { Err(err) });
        }

        let total = self.events.len();
        let per_page = self.page_len.unwrap_or(total).max(1);
        let mut progress = PageProgress::default();
        loop {
            progress.pages += 1;
            progress.events = (progress.events + per_page).min(total);
            on_page(progress);
            if progress.events == total {
                break;
            }
        }

        let result = FetchResult {
            events: self.events.clone(),
            pages: progress.pages,
        };
        Box::pin(async move { Ok(result) })
    }

    fn delete_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        self.delete_calls
            .lock()
            .unwrap()
            .push((calendar_id.to_string(), event_id.to_string()));
        let result = if self.failing_ids.contains(event_id) {
            Err(ProviderError::unexpected_status("HTTP 500: backend error"))
        } else if self.gone_ids.contains(event_id) {
            Err(ProviderError::gone(format!("event {} not found", event_id)))
        } else {
            Ok(())
        };
        Box::pin(async move { result })
    }

    fn is_authenticated(&self) -> bool {
        true
    }
}
