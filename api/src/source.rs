//! Schedule sources: where raw rows come from.
//!
//! Every source answers the same question ("what rows does this season
//! have?") so the live scrapers and the curated table are interchangeable.
//! Page-level failures are contained: a page that cannot be fetched just
//! contributes nothing.
use crate::normalize::{AWAY_MARKER, HOME_MARKER};
use crate::{ApiError, ApiResult, RawScheduleEntry};
use log::{debug, info, warn};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const ESPN_SCHEDULE: &str = "https://www.espn.com/mlb/team/schedule/_/name/tor";
const MLB_SCHEDULE: &str = "https://www.mlb.com/bluejays/schedule";
/// Regular season months, March through October.
const SEASON_MONTHS: [u32; 8] = [3, 4, 5, 6, 7, 8, 9, 10];
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";
const EMBEDDED_TABLE_JSON: &str = include_str!("../data/home_games.json");

#[allow(async_fn_in_trait)]
pub trait ScheduleSource {
    /// Rows for `season`, in schedule order. Away rows may be included as
    /// long as they carry the away marker.
    async fn fetch_season_entries(&self, season: i32) -> ApiResult<Vec<RawScheduleEntry>>;
}

/// Fetch a season and insist on getting something back. An empty schedule
/// means every source failed, and nothing downstream should run.
pub async fn fetch_schedule<S: ScheduleSource>(
    source: &S,
    season: i32,
) -> ApiResult<Vec<RawScheduleEntry>> {
    let entries = source.fetch_season_entries(season).await?;
    if entries.is_empty() {
        return Err(ApiError::NotFound(format!("no schedule rows for the {season} season")));
    }
    info!("fetched {} schedule rows for {season}", entries.len());
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Page fetching + row scanning shared by the live sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    timeout: Duration,
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent(BROWSER_USER_AGENT)
                .build()
                .unwrap_or_default(),
            timeout: Duration::from_secs(20),
        }
    }
}

impl PageFetcher {
    pub async fn fetch_text(&self, url: &str) -> ApiResult<String> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), url: url.to_owned() });
        }
        response
            .text()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }

    /// Fetch and scan one page; any failure yields zero rows.
    async fn scan_page(&self, url: &str) -> Vec<RawScheduleEntry> {
        match self.fetch_text(url).await {
            Ok(html) => {
                let rows = parse_schedule_rows(&html);
                debug!("{url}: {} schedule rows", rows.len());
                rows
            }
            Err(e) => {
                warn!("skipping schedule page: {e}");
                Vec::new()
            }
        }
    }
}

/// Scan table rows for games. A row counts when it has at least two cells and
/// the second starts with a home (`vs`) or away (`@`) marker. The first cell is
/// the date, the optional third the start time.
pub fn parse_schedule_rows(html: &str) -> Vec<RawScheduleEntry> {
    let document = Html::parse_document(html);
    let (Ok(row_selector), Ok(cell_selector)) = (Selector::parse("tr"), Selector::parse("td"))
    else {
        return Vec::new();
    };

    document
        .select(&row_selector)
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&cell_selector).map(cell_text).collect();
            if cells.len() < 2 {
                return None;
            }
            let opponent = &cells[1];
            if !opponent.starts_with(HOME_MARKER) && !opponent.starts_with(AWAY_MARKER) {
                return None;
            }
            let time = cells.get(2).filter(|t| !t.is_empty()).cloned();
            Some(RawScheduleEntry {
                date_text: cells[0].clone(),
                opponent_text: opponent.clone(),
                time_text: time,
            })
        })
        .collect()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// ESPN team schedule: one page per season
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EspnSchedulePage {
    fetcher: PageFetcher,
    base_url: String,
}

impl Default for EspnSchedulePage {
    fn default() -> Self {
        Self {
            fetcher: PageFetcher::default(),
            base_url: ESPN_SCHEDULE.to_owned(),
        }
    }
}

impl EspnSchedulePage {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    fn season_url(&self, season: i32) -> String {
        format!("{}/season/{season}/seasontype/2", self.base_url)
    }
}

impl ScheduleSource for EspnSchedulePage {
    async fn fetch_season_entries(&self, season: i32) -> ApiResult<Vec<RawScheduleEntry>> {
        Ok(self.fetcher.scan_page(&self.season_url(season)).await)
    }
}

// ---------------------------------------------------------------------------
// Club schedule: one page per month
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MonthlySchedulePages {
    fetcher: PageFetcher,
    base_url: String,
}

impl Default for MonthlySchedulePages {
    fn default() -> Self {
        Self {
            fetcher: PageFetcher::default(),
            base_url: MLB_SCHEDULE.to_owned(),
        }
    }
}

impl MonthlySchedulePages {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    fn month_url(&self, season: i32, month: u32) -> String {
        format!("{}/{season}-{month:02}", self.base_url)
    }
}

impl ScheduleSource for MonthlySchedulePages {
    async fn fetch_season_entries(&self, season: i32) -> ApiResult<Vec<RawScheduleEntry>> {
        let mut entries = Vec::new();
        for month in SEASON_MONTHS {
            let rows = self.fetcher.scan_page(&self.month_url(season, month)).await;
            entries.extend(rows);
        }
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// Curated table of home games
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
struct ScheduleTable {
    seasons: Vec<SeasonTable>,
}

#[derive(Debug, Deserialize, Clone)]
struct SeasonTable {
    season: i32,
    /// Set when the table lists only part of the season's home games.
    #[serde(default)]
    partial: bool,
    games: Vec<RawScheduleEntry>,
}

/// Home games known ahead of time, either the table shipped with the crate
/// or one supplied by the user.
#[derive(Debug, Clone, Default)]
pub struct StaticSchedule {
    table: ScheduleTable,
}

impl StaticSchedule {
    pub fn embedded() -> ApiResult<Self> {
        Self::from_json(EMBEDDED_TABLE_JSON, "embedded schedule table")
    }

    pub fn from_file(path: &Path) -> ApiResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ApiError::NotFound(format!("could not read {}: {e}", path.display())))?;
        Self::from_json(&content, &path.display().to_string())
    }

    pub fn from_json(json: &str, origin: &str) -> ApiResult<Self> {
        let table = serde_json::from_str(json).map_err(|source| ApiError::Json {
            source,
            origin: origin.to_owned(),
        })?;
        Ok(Self { table })
    }

    fn season(&self, season: i32) -> Option<&SeasonTable> {
        self.table.seasons.iter().find(|s| s.season == season)
    }

    /// True when `entries` is exactly this table's partial listing for `season`.
    pub fn served_partial(&self, season: i32, entries: &[RawScheduleEntry]) -> bool {
        self.season(season)
            .is_some_and(|s| s.partial && s.games.as_slice() == entries)
    }
}

impl ScheduleSource for StaticSchedule {
    async fn fetch_season_entries(&self, season: i32) -> ApiResult<Vec<RawScheduleEntry>> {
        let table = self
            .season(season)
            .ok_or_else(|| ApiError::NotFound(format!("schedule table has no {season} season")))?;
        if table.partial {
            warn!(
                "schedule table for {season} is partial ({} games); supply the full season as a JSON table",
                table.games.len()
            );
        }
        Ok(table.games.clone())
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Use `primary`, unless it comes back empty or errors, then use `fallback`.
#[derive(Debug, Clone)]
pub struct WithFallback<P, F> {
    pub primary: P,
    pub fallback: F,
}

impl<P, F> WithFallback<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: ScheduleSource, F: ScheduleSource> ScheduleSource for WithFallback<P, F> {
    async fn fetch_season_entries(&self, season: i32) -> ApiResult<Vec<RawScheduleEntry>> {
        match self.primary.fetch_season_entries(season).await {
            Ok(entries) if !entries.is_empty() => return Ok(entries),
            Ok(_) => info!("live schedule empty for {season}, using fallback"),
            Err(e) => warn!("live schedule failed for {season} ({e}), using fallback"),
        }
        self.fallback.fetch_season_entries(season).await
    }
}
