use crate::google::{
    EventDateTime, EventsListResponse, GoogleEvent, NewEvent, ReminderOverride, Reminders,
};
use crate::{ApiError, ApiResult, CalendarEventDraft, EventSummary};
use chrono::{DateTime, NaiveDateTime, Utc};
use log::debug;
use reqwest::{Client, RequestBuilder, Response, Url};
use std::time::Duration;

const GOOGLE_CALENDAR_V3: &str = "https://www.googleapis.com/calendar/v3";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Events overlapping `[time_min, time_max]` whose text matches `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    pub text: String,
}

/// What the synchronizer needs from a calendar: look events up, add new ones.
#[allow(async_fn_in_trait)]
pub trait CalendarService {
    async fn list_events(&self, query: &EventQuery) -> ApiResult<Vec<EventSummary>>;
    async fn insert_event(&self, draft: &CalendarEventDraft) -> ApiResult<EventSummary>;
}

/// Google Calendar client for a single calendar, authorized with a bearer token.
#[derive(Debug, Clone)]
pub struct GoogleCalendar {
    client: Client,
    base_url: String,
    calendar_id: String,
    access_token: String,
    timeout: Duration,
}

impl GoogleCalendar {
    pub fn new(access_token: impl Into<String>, calendar_id: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("jayscal/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url: GOOGLE_CALENDAR_V3.to_owned(),
            calendar_id: calendar_id.into(),
            access_token: access_token.into(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Point the client at another host (a local mock in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Calendar IDs may contain `#` or `/`, so the ID goes in as an encoded
    /// path segment.
    fn events_url(&self) -> ApiResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Other(format!("bad calendar URL {:?}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Other(format!("calendar URL {:?} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> ApiResult<Response> {
        let response = request
            .bearer_auth(&self.access_token)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else if status.as_u16() == 401 || status.as_u16() == 403 {
            Err(ApiError::Auth { status: status.as_u16(), url: url.to_string() })
        } else {
            Err(ApiError::Status { status: status.as_u16(), url: url.to_string() })
        }
    }
}

impl CalendarService for GoogleCalendar {
    async fn list_events(&self, query: &EventQuery) -> ApiResult<Vec<EventSummary>> {
        let url = self.events_url()?;
        debug!("listing events matching {:?} from {} to {}", query.text, query.time_min, query.time_max);

        let request = self.client.get(url.clone()).query(&[
            ("timeMin", format_utc(query.time_min)),
            ("timeMax", format_utc(query.time_max)),
            ("q", query.text.clone()),
            ("singleEvents", "true".to_owned()),
        ]);
        let raw: EventsListResponse = self
            .send(request, &url)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_string()))?;

        Ok(raw
            .items
            .unwrap_or_default()
            .into_iter()
            .filter(|e| e.status.as_deref() != Some("cancelled"))
            .map(map_event)
            .collect())
    }

    async fn insert_event(&self, draft: &CalendarEventDraft) -> ApiResult<EventSummary> {
        let url = self.events_url()?;
        let body = to_new_event(draft);

        let created: GoogleEvent = self
            .send(self.client.post(url.clone()).json(&body), &url)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_string()))?;
        Ok(map_event(created))
    }
}

// ---------------------------------------------------------------------------
// Mapping: domain types ↔ Google wire types
// ---------------------------------------------------------------------------

/// RFC 3339 in UTC with a literal `Z`, the form Google expects for timeMin/timeMax.
pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn local_date_time(at: NaiveDateTime, time_zone: &str) -> EventDateTime {
    EventDateTime {
        date_time: at.format(DATE_TIME_FORMAT).to_string(),
        time_zone: time_zone.to_owned(),
    }
}

pub fn to_new_event(draft: &CalendarEventDraft) -> NewEvent {
    NewEvent {
        summary: draft.title.clone(),
        location: draft.location.clone(),
        description: draft.description.clone(),
        start: local_date_time(draft.start, &draft.timezone),
        end: local_date_time(draft.end, &draft.timezone),
        reminders: Reminders {
            use_default: false,
            overrides: draft
                .reminders
                .iter()
                .map(|r| ReminderOverride {
                    method: "popup".into(),
                    minutes: r.minutes_before_start,
                })
                .collect(),
        },
        color_id: draft.color_id.clone(),
    }
}

fn map_event(event: GoogleEvent) -> EventSummary {
    // All-day events carry only `date`; they have no start instant.
    let start = event
        .start
        .and_then(|s| s.date_time)
        .and_then(|t| DateTime::parse_from_rfc3339(&t).ok())
        .map(|t| t.with_timezone(&Utc));
    EventSummary {
        id: event.id.unwrap_or_default(),
        title: event.summary.unwrap_or_default(),
        start,
    }
}
