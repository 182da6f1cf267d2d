/// Google Calendar v3 wire types — serde shapes for the events resource.
/// These map to and from our clean domain types in calendar.rs.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// events.list
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EventsListResponse {
    pub items: Option<Vec<GoogleEvent>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct GoogleEvent {
    pub id: Option<String>,
    pub summary: Option<String>,
    pub status: Option<String>, // "confirmed" | "tentative" | "cancelled"
    pub start: Option<EventStart>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EventStart {
    /// RFC 3339 with offset; absent on all-day events.
    pub date_time: Option<String>,
    pub date: Option<String>,
}

// ---------------------------------------------------------------------------
// events.insert
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub summary: String,
    pub location: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub reminders: Reminders,
    pub color_id: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// Local wall-clock time without offset; `time_zone` disambiguates.
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ReminderOverride {
    pub method: String, // "popup" | "email"
    pub minutes: u32,
}
