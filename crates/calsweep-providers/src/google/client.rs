//! Google Calendar API client.
//!
//! Thin HTTP layer over the Calendar API v3 `events.list` and `events.delete`
//! endpoints. Authentication is a bearer token handed in by the provider.

use std::time::Duration;

use calsweep_core::{CalendarEvent, EventTime};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::pagination::{EventPage, collect_pages};
use crate::provider::{FetchOptions, FetchResult, PageProgress};

use super::config::GoogleConfig;

/// Google Calendar API client.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl GoogleCalendarClient {
    /// Creates a new Google Calendar client with the given access token.
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            access_token: access_token.into(),
            base_url: GoogleConfig::CALENDAR_API_BASE.to_string(),
        })
    }

    /// Points the client at another API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Updates the access token (after refresh).
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
    }

    /// Lists every event in the options' window, following page tokens.
    pub async fn list_events(
        &self,
        options: &FetchOptions,
        on_page: impl FnMut(PageProgress),
    ) -> ProviderResult<FetchResult> {
        let result = collect_pages(
            |page_token| self.list_events_page(options, page_token),
            on_page,
        )
        .await?;
        debug!(
            "fetched {} events from calendar {} in {} pages",
            result.events.len(),
            options.calendar_id,
            result.pages
        );
        Ok(result)
    }

    /// Fetches a single page of events.
    async fn list_events_page(
        &self,
        options: &FetchOptions,
        page_token: Option<String>,
    ) -> ProviderResult<EventPage> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&options.calendar_id)
        );

        let mut request = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", options.time_window.start_rfc3339()),
                ("timeMax", options.time_window.end_rfc3339()),
            ])
            .query(&[("singleEvents", "true"), ("orderBy", "startTime")]);

        if let Some(max) = options.page_size {
            request = request.query(&[("maxResults", max.to_string())]);
        }

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await.map_err(request_error)?;
        let response = check_status(response, "list events").await?;

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::transport(format!("failed to read response: {}", e)))?;

        let list: EventListResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::malformed(format!("failed to parse response: {}", e))
        })?;

        let items = list
            .items
            .into_iter()
            .filter_map(|event| convert_event(event, &options.calendar_id))
            .collect();

        Ok(EventPage {
            items,
            next_page_token: list.next_page_token,
        })
    }

    /// Deletes one event.
    ///
    /// An event that is already gone (404 or 410) comes back as a
    /// `Gone` error so the caller can decide how to count it.
    pub async fn delete_event(&self, calendar_id: &str, event_id: &str) -> ProviderResult<()> {
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.base_url,
            urlencoding::encode(calendar_id),
            urlencoding::encode(event_id)
        );

        let response = self
            .http_client
            .delete(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(request_error)?;

        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::GONE) {
            return Err(ProviderError::gone(format!(
                "event {} no longer exists",
                event_id
            )));
        }

        check_status(response, "delete event").await?;
        debug!("deleted event {}", event_id);
        Ok(())
    }
}

fn request_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::transport("request timeout")
    } else if e.is_connect() {
        ProviderError::transport(format!("connection failed: {}", e))
    } else {
        ProviderError::transport(format!("request failed: {}", e))
    }
}

/// Maps non-success statuses to provider errors.
async fn check_status(response: Response, what: &str) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            Err(ProviderError::rate_limited(format!(
                "rate limit exceeded{}",
                retry_after
                    .map(|s| format!(", retry after {} seconds", s))
                    .unwrap_or_default()
            )))
        }
        StatusCode::UNAUTHORIZED => Err(ProviderError::unauthenticated(
            "access token expired or invalid",
        )),
        StatusCode::FORBIDDEN => {
            let body = response.text().await.unwrap_or_default();
            Err(ProviderError::forbidden(format!(
                "{} forbidden: {}",
                what, body
            )))
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(ProviderError::unexpected_status(format!(
                "{} failed ({}): {}",
                what, status, body
            )))
        }
    }
}

/// Converts an API event, dropping entries that cannot be acted on.
fn convert_event(event: ApiEvent, calendar_id: &str) -> Option<CalendarEvent> {
    let Some(id) = event.id else {
        warn!("skipping event without id: {:?}", event.summary);
        return None;
    };

    if event.status.as_deref() == Some("cancelled") {
        debug!("skipping cancelled event {}", id);
        return None;
    }

    let mut converted = match event.summary {
        Some(summary) => CalendarEvent::new(id, calendar_id).with_summary(summary),
        None => CalendarEvent::new(id, calendar_id),
    };
    converted.recurring_event_id = event.recurring_event_id;
    converted.start = event.start.and_then(|start| start.parse(&converted.id));
    Some(converted)
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<ApiEvent>,
    next_page_token: Option<String>,
}

/// A single event from the Google Calendar API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    id: Option<String>,
    summary: Option<String>,
    start: Option<ApiEventTime>,
    status: Option<String>,
    recurring_event_id: Option<String>,
}

/// Event time from the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date: Option<String>,
    date_time: Option<String>,
}

impl ApiEventTime {
    fn parse(self, event_id: &str) -> Option<EventTime> {
        match (self.date_time, self.date) {
            (Some(dt), _) => DateTime::parse_from_rfc3339(&dt)
                .map(|parsed| EventTime::from_utc(parsed.with_timezone(&Utc)))
                .map_err(|e| warn!("event {}: bad start time {:?}: {}", event_id, dt, e))
                .ok(),
            (None, Some(date)) => NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map(EventTime::from_date)
                .map_err(|e| warn!("event {}: bad start date {:?}: {}", event_id, date, e))
                .ok(),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calsweep_core::TimeWindow;
    use crate::error::ProviderErrorKind;
    use chrono::TimeZone;
    use wiremock::matchers::{bearer_token, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EVENTS_PATH: &str = "/calendars/primary/events";

    fn client(server: &MockServer) -> GoogleCalendarClient {
        GoogleCalendarClient::new("test-token", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri())
    }

    fn options() -> FetchOptions {
        FetchOptions::new("primary", TimeWindow::for_year(2026).unwrap())
    }

    fn api_event(id: &str, summary: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "summary": summary,
            "status": "confirmed",
            "start": { "dateTime": "2026-03-02T09:00:00Z" },
            "end": { "dateTime": "2026-03-02T09:15:00Z" }
        })
    }

    #[test]
    fn parse_event_list_response() {
        let json = r#"{
            "kind": "calendar#events",
            "items": [
                {
                    "id": "event1",
                    "summary": "Weekly Sync",
                    "start": { "dateTime": "2026-03-15T10:00:00+01:00" },
                    "recurringEventId": "series1"
                },
                {
                    "id": "event2",
                    "start": { "date": "2026-03-16" }
                }
            ],
            "nextPageToken": "abc"
        }"#;

        let response: EventListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.items.len(), 2);
        assert_eq!(response.next_page_token.as_deref(), Some("abc"));

        let events: Vec<_> = response
            .items
            .into_iter()
            .filter_map(|e| convert_event(e, "primary"))
            .collect();

        assert_eq!(events[0].summary.as_deref(), Some("Weekly Sync"));
        assert_eq!(events[0].recurring_event_id.as_deref(), Some("series1"));
        assert_eq!(
            events[0].start,
            Some(EventTime::from_utc(
                Utc.with_ymd_and_hms(2026, 3, 15, 9, 0, 0).unwrap()
            ))
        );

        assert!(events[1].summary.is_none());
        assert_eq!(events[1].display_title(), "No Title");
        assert_eq!(
            events[1].start,
            Some(EventTime::from_date(NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()))
        );
    }

    #[test]
    fn convert_skips_unusable_events() {
        let without_id: ApiEvent = serde_json::from_str(r#"{ "summary": "Ghost" }"#).unwrap();
        assert!(convert_event(without_id, "primary").is_none());

        let cancelled: ApiEvent =
            serde_json::from_str(r#"{ "id": "x", "status": "cancelled" }"#).unwrap();
        assert!(convert_event(cancelled, "primary").is_none());
    }

    #[test]
    fn convert_keeps_event_with_bad_start() {
        let event: ApiEvent = serde_json::from_str(
            r#"{ "id": "x", "summary": "Odd", "start": { "dateTime": "yesterday" } }"#,
        )
        .unwrap();
        let converted = convert_event(event, "primary").unwrap();
        assert_eq!(converted.id, "x");
        assert!(converted.start.is_none());
    }

    #[tokio::test]
    async fn list_follows_page_tokens() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .and(bearer_token("test-token"))
            .and(query_param("timeMin", "2026-01-01T00:00:00Z"))
            .and(query_param("timeMax", "2027-01-01T00:00:00Z"))
            .and(query_param("singleEvents", "true"))
            .and(query_param("orderBy", "startTime"))
            .and(query_param_is_missing("pageToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [api_event("a", "Standup"), api_event("b", "Standup 2")],
                "nextPageToken": "page-2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .and(query_param("pageToken", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [api_event("c", "Lunch")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut progress = Vec::new();
        let result = client(&server)
            .list_events(&options(), |p| progress.push(p.events))
            .await
            .unwrap();
        let ids: Vec<_> = result.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(result.pages, 2);
        assert_eq!(progress, vec![2, 3]);
        assert!(result.events.iter().all(|e| e.calendar_id == "primary"));
    }

    #[tokio::test]
    async fn list_empty_calendar() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "calendar#events"
            })))
            .mount(&server)
            .await;

        let result = client(&server).list_events(&options(), |_| {}).await.unwrap();
        assert!(result.events.is_empty());
        assert_eq!(result.pages, 1);
    }

    #[tokio::test]
    async fn list_passes_page_size() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .and(query_param("maxResults", "2500"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let options = options().with_page_size(2500);
        client(&server).list_events(&options, |_| {}).await.unwrap();
    }

    #[tokio::test]
    async fn list_failure_on_later_page_fails_whole_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .and(query_param_is_missing("pageToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [api_event("a", "Standup")],
                "nextPageToken": "page-2"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .and(query_param("pageToken", "page-2"))
            .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
            .mount(&server)
            .await;

        let err = client(&server).list_events(&options(), |_| {}).await.unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::UnexpectedStatus);
        assert!(err.message().contains("503"));
    }

    #[tokio::test]
    async fn list_maps_auth_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server).list_events(&options(), |_| {}).await.unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::Unauthenticated);
    }

    #[tokio::test]
    async fn list_rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client(&server).list_events(&options(), |_| {}).await.unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::Malformed);
    }

    #[tokio::test]
    async fn delete_succeeds_on_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/calendars/primary/events/evt1"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).delete_event("primary", "evt1").await.unwrap();
    }

    #[tokio::test]
    async fn delete_encodes_calendar_id() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/calendars/me%40example.com/events/evt1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .delete_event("me@example.com", "evt1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_of_missing_event_is_gone() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/calendars/primary/events/evt1"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let err = client(&server).delete_event("primary", "evt1").await.unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::Gone);
    }

    #[tokio::test]
    async fn delete_on_read_only_calendar_is_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/calendars/primary/events/evt1"))
            .respond_with(ResponseTemplate::new(403).set_body_string("insufficient permissions"))
            .mount(&server)
            .await;

        let err = client(&server).delete_event("primary", "evt1").await.unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::Forbidden);
        assert!(err.message().contains("insufficient permissions"));
    }
}
