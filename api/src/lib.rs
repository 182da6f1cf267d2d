pub mod calendar;
pub mod error;
pub mod google;
pub mod normalize;
pub mod source;
pub mod sync;

pub use error::{ApiError, ApiResult};

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of page markup and calendar wire format
// ---------------------------------------------------------------------------

/// Default start time for games without an announced (or readable) time.
pub const DEFAULT_START_TIME: (u32, u32) = (19, 0);

/// Who the calendar is being kept for. Everything team-specific that ends up
/// in an event (title, venue, colour, reminders) comes from here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamProfile {
    pub name: String,      // "Blue Jays" — used in titles and duplicate queries
    pub full_name: String, // "Toronto Blue Jays"
    pub venue: String,
    pub location: String,
    /// IANA timezone name sent with every event.
    pub timezone: String,
    /// Google Calendar colour designator.
    pub color_id: String,
    pub game_duration: Duration,
    pub reminder_minutes: Vec<u32>,
}

impl TeamProfile {
    pub fn blue_jays() -> Self {
        Self {
            name: "Blue Jays".into(),
            full_name: "Toronto Blue Jays".into(),
            venue: "Rogers Centre".into(),
            location: "Rogers Centre, Toronto, ON".into(),
            timezone: "America/Toronto".into(),
            color_id: "9".into(),
            game_duration: Duration::hours(3),
            reminder_minutes: vec![60, 1440],
        }
    }

    /// Event title, also the free-text query used to find an existing entry.
    pub fn title_against(&self, opponent: &str) -> String {
        format!("{} vs {}", self.name, opponent)
    }
}

impl Default for TeamProfile {
    fn default() -> Self {
        Self::blue_jays()
    }
}

/// One row as it came out of a schedule source, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawScheduleEntry {
    #[serde(rename = "date")]
    pub date_text: String,
    /// May carry a home/away marker prefix ("vs", "@").
    #[serde(rename = "opponent")]
    pub opponent_text: String,
    /// `None` means the source did not give a time (TBD).
    #[serde(rename = "time", default)]
    pub time_text: Option<String>,
}

impl RawScheduleEntry {
    pub fn new(date: &str, opponent: &str, time: Option<&str>) -> Self {
        Self {
            date_text: date.to_owned(),
            opponent_text: opponent.to_owned(),
            time_text: time.map(str::to_owned),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeAway {
    Home,
    Away,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedGame {
    pub date: NaiveDate,
    /// Local wall-clock time at the venue. Always set; see `time_confirmed`.
    pub start_time: NaiveTime,
    pub opponent: String,
    pub home_away: HomeAway,
    /// False when the source had no usable time and the default was applied.
    pub time_confirmed: bool,
}

impl NormalizedGame {
    pub fn is_home(&self) -> bool {
        self.home_away == HomeAway::Home
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reminder {
    pub minutes_before_start: u32,
}

/// Everything the calendar needs to create one game entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEventDraft {
    pub title: String,
    pub location: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub timezone: String,
    pub reminders: Vec<Reminder>,
    pub color_id: String,
}

impl CalendarEventDraft {
    pub fn for_game(team: &TeamProfile, game: &NormalizedGame) -> Self {
        let start = game.starts_at();
        let game_time = if game.time_confirmed {
            start.format("%-I:%M %p").to_string()
        } else {
            "To Be Determined".to_owned()
        };

        Self {
            title: team.title_against(&game.opponent),
            location: team.location.clone(),
            description: format!(
                "{} home game against {}\n\nGame time: {}\nVenue: {}",
                team.full_name, game.opponent, game_time, team.venue
            ),
            start,
            end: start + team.game_duration,
            timezone: team.timezone.clone(),
            reminders: team
                .reminder_minutes
                .iter()
                .map(|&minutes_before_start| Reminder { minutes_before_start })
                .collect(),
            color_id: team.color_id.clone(),
        }
    }
}

/// Summary of an event that already lives in the calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSummary {
    pub id: String,
    pub title: String,
    /// `None` for all-day events.
    pub start: Option<DateTime<Utc>>,
}

/// Tally for one synchronization run. `added + skipped + failed == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub total: usize,
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SyncOutcome {
    pub fn is_balanced(&self) -> bool {
        self.added + self.skipped + self.failed == self.total
    }
}
