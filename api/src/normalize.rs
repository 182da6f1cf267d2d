//! Turns loosely formatted schedule rows into [`NormalizedGame`]s.
//!
//! Dates come either as an abbreviated weekday/month/day ("Thu, Mar 26",
//! year taken from the season) or as ISO `YYYY-MM-DD`. Times are 12-hour
//! clock readings ("7:07 PM", "7:07PM"); anything else falls back to
//! [`DEFAULT_START_TIME`]. Opponents given as an abbreviation are expanded.
use crate::{DEFAULT_START_TIME, HomeAway, NormalizedGame, RawScheduleEntry};
use chrono::{Datelike, NaiveDate, NaiveTime};
use log::{debug, warn};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

pub const HOME_MARKER: &str = "vs";
pub const AWAY_MARKER: &str = "@";

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}):(\d{2})\s*(AM|PM)").expect("valid time pattern"));

/// MLB club abbreviations as they appear on schedule pages.
const TEAM_ABBREVIATIONS: &[(&str, &str)] = &[
    ("ARI", "Diamondbacks"),
    ("AZ", "Diamondbacks"),
    ("ATH", "Athletics"),
    ("OAK", "Athletics"),
    ("ATL", "Braves"),
    ("BAL", "Orioles"),
    ("BOS", "Red Sox"),
    ("CHC", "Cubs"),
    ("CHW", "White Sox"),
    ("CWS", "White Sox"),
    ("CIN", "Reds"),
    ("CLE", "Guardians"),
    ("COL", "Rockies"),
    ("DET", "Tigers"),
    ("HOU", "Astros"),
    ("KC", "Royals"),
    ("LAA", "Angels"),
    ("LAD", "Dodgers"),
    ("MIA", "Marlins"),
    ("MIL", "Brewers"),
    ("MIN", "Twins"),
    ("NYM", "Mets"),
    ("NYY", "Yankees"),
    ("PHI", "Phillies"),
    ("PIT", "Pirates"),
    ("SD", "Padres"),
    ("SF", "Giants"),
    ("SEA", "Mariners"),
    ("STL", "Cardinals"),
    ("TB", "Rays"),
    ("TEX", "Rangers"),
    ("TOR", "Blue Jays"),
    ("WSH", "Nationals"),
];

/// Why an entry did not become a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    UnreadableDate(String),
    OutsideSeason { date: NaiveDate, season: i32 },
    /// Nothing left once the marker is removed, e.g. a bare `vs`.
    MissingOpponent(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::UnreadableDate(text) => write!(f, "unreadable date {text:?}"),
            Rejection::OutsideSeason { date, season } => {
                write!(f, "date {date} is outside the {season} season")
            }
            Rejection::MissingOpponent(text) => write!(f, "no opponent in {text:?}"),
        }
    }
}

pub fn normalize(entry: &RawScheduleEntry, season: i32) -> Result<NormalizedGame, Rejection> {
    let date = parse_date(&entry.date_text, season)
        .ok_or_else(|| Rejection::UnreadableDate(entry.date_text.clone()))?;
    if date.year() != season {
        return Err(Rejection::OutsideSeason { date, season });
    }

    let (home_away, opponent) = classify_opponent(&entry.opponent_text);
    if opponent.is_empty() {
        return Err(Rejection::MissingOpponent(entry.opponent_text.clone()));
    }
    let parsed_time = entry.time_text.as_deref().and_then(parse_time);

    Ok(NormalizedGame {
        date,
        start_time: parsed_time.unwrap_or_else(default_start_time),
        opponent: expand_abbreviation(opponent),
        home_away,
        time_confirmed: parsed_time.is_some(),
    })
}

/// Normalize a batch, keeping only home games. Rejected rows and away games
/// are logged and dropped.
pub fn normalize_all(entries: &[RawScheduleEntry], season: i32) -> Vec<NormalizedGame> {
    let mut games = Vec::with_capacity(entries.len());
    for entry in entries {
        match normalize(entry, season) {
            Ok(game) if game.is_home() => games.push(game),
            Ok(game) => debug!("dropping away game @ {} on {}", game.opponent, game.date),
            Err(rejection) => warn!(
                "skipping {:?} on {:?}: {rejection}",
                entry.opponent_text, entry.date_text
            ),
        }
    }
    games
}

pub fn parse_date(text: &str, season: i32) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{text}, {season}"), "%a, %b %d, %Y"))
        .ok()
}

/// Parse `H:MM AM|PM` (space optional) into a 24-hour time.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let caps = TIME_RE.captures(text)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }

    let hour = match (&caps[3], hour) {
        ("AM", 12) => 0,
        ("PM", 12) => 12,
        ("PM", h) => h + 12,
        (_, h) => h,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

pub fn default_start_time() -> NaiveTime {
    let (hour, minute) = DEFAULT_START_TIME;
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Split a marker prefix off the opponent text. Unmarked text is a home game:
/// curated tables only list home games.
pub fn classify_opponent(text: &str) -> (HomeAway, &str) {
    let text = text.trim();
    if let Some(rest) = text.strip_prefix(HOME_MARKER) {
        (HomeAway::Home, rest.trim())
    } else if let Some(rest) = text.strip_prefix(AWAY_MARKER) {
        (HomeAway::Away, rest.trim())
    } else {
        (HomeAway::Home, text)
    }
}

pub fn expand_abbreviation(opponent: &str) -> String {
    let opponent = opponent.trim();
    TEAM_ABBREVIATIONS
        .iter()
        .find(|(abbrev, _)| *abbrev == opponent)
        .map(|(_, name)| (*name).to_owned())
        .unwrap_or_else(|| opponent.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(time: NaiveTime) -> String {
        time.format("%H:%M").to_string()
    }

    #[test]
    fn converts_twelve_hour_clock() {
        assert_eq!(hm(parse_time("7:07PM").unwrap()), "19:07");
        assert_eq!(hm(parse_time("7:07 PM").unwrap()), "19:07");
        assert_eq!(hm(parse_time("12:10PM").unwrap()), "12:10");
        assert_eq!(hm(parse_time("12:05AM").unwrap()), "00:05");
        assert_eq!(hm(parse_time("1:37AM").unwrap()), "01:37");
    }

    #[test]
    fn rejects_impossible_clock_readings() {
        assert_eq!(parse_time("13:10 PM"), None);
        assert_eq!(parse_time("0:30 AM"), None);
        assert_eq!(parse_time("7:75 PM"), None);
        assert_eq!(parse_time("TBD"), None);
        assert_eq!(parse_time("7:07 pm"), None);
    }

    #[test]
    fn unspecified_or_garbled_time_defaults_to_seven_pm() {
        for time in [None, Some("TBD"), Some("evening")] {
            let game = normalize(&RawScheduleEntry::new("2026-04-01", "Rockies", time), 2026).unwrap();
            assert_eq!(hm(game.start_time), "19:00");
            assert!(!game.time_confirmed);
        }
    }

    #[test]
    fn parses_both_date_shapes() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 26).unwrap();
        assert_eq!(parse_date("Thu, Mar 26", 2026), Some(expected));
        assert_eq!(parse_date(" 2026-03-26 ", 2026), Some(expected));
        assert_eq!(parse_date("March 26th", 2026), None);
    }

    #[test]
    fn rejects_unreadable_and_out_of_season_dates() {
        let bad = RawScheduleEntry::new("Opening Day", "Athletics", Some("7:07PM"));
        assert_eq!(
            normalize(&bad, 2026),
            Err(Rejection::UnreadableDate("Opening Day".into()))
        );

        let last_year = RawScheduleEntry::new("2025-09-28", "Rays", None);
        assert!(matches!(
            normalize(&last_year, 2026),
            Err(Rejection::OutsideSeason { season: 2026, .. })
        ));
    }

    #[test]
    fn bare_marker_has_no_opponent() {
        let bare = RawScheduleEntry::new("2026-04-07", "vs", Some("7:07 PM"));
        assert_eq!(
            normalize(&bare, 2026),
            Err(Rejection::MissingOpponent("vs".into()))
        );
        let blank = RawScheduleEntry::new("2026-04-08", "  @ ", None);
        assert!(matches!(normalize(&blank, 2026), Err(Rejection::MissingOpponent(_))));

        let entries = vec![bare, RawScheduleEntry::new("2026-04-09", "vs NYY", None)];
        let games = normalize_all(&entries, 2026);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].opponent, "Yankees");
    }

    #[test]
    fn only_home_games_survive_the_batch() {
        let entries = vec![
            RawScheduleEntry::new("2026-04-07", "vs Yankees", Some("7:07 PM")),
            RawScheduleEntry::new("2026-04-10", "@ Red Sox", Some("7:10 PM")),
        ];
        let games = normalize_all(&entries, 2026);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].opponent, "Yankees");
    }

    #[test]
    fn marker_is_case_sensitive() {
        assert_eq!(classify_opponent("vsYankees"), (HomeAway::Home, "Yankees"));
        assert_eq!(classify_opponent("@ Red Sox"), (HomeAway::Away, "Red Sox"));
        assert_eq!(classify_opponent("VS Yankees"), (HomeAway::Home, "VS Yankees"));
    }

    #[test]
    fn expands_known_abbreviations_only() {
        assert_eq!(expand_abbreviation("NYY"), "Yankees");
        assert_eq!(expand_abbreviation(" Athletics "), "Athletics");
        assert_eq!(expand_abbreviation("Springfield Isotopes"), "Springfield Isotopes");

        let game = normalize(&RawScheduleEntry::new("2026-06-02", "vs NYY", None), 2026).unwrap();
        assert_eq!(game.opponent, "Yankees");
    }

    #[test]
    fn bad_rows_do_not_stop_the_batch() {
        let entries = vec![
            RawScheduleEntry::new("not a date", "Athletics", None),
            RawScheduleEntry::new("Fri, Mar 27", "Athletics", Some("7:07PM")),
        ];
        let games = normalize_all(&entries, 2026);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].starts_at().to_string(), "2026-03-27 19:07:00");
    }
}
