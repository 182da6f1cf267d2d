use crate::config::SourceKind;
use jayscal_api::source::{
    EspnSchedulePage, MonthlySchedulePages, ScheduleSource, StaticSchedule, WithFallback,
};
use jayscal_api::{ApiResult, RawScheduleEntry};
use std::path::Path;

/// The schedule source picked on the command line.
pub enum SelectedSource {
    Espn(EspnSchedulePage),
    Monthly(MonthlySchedulePages),
    Static(StaticSchedule),
    Auto(WithFallback<MonthlySchedulePages, StaticSchedule>),
}

impl SelectedSource {
    pub fn new(kind: SourceKind, table_path: Option<&Path>) -> ApiResult<Self> {
        Ok(match kind {
            SourceKind::Espn => Self::Espn(EspnSchedulePage::default()),
            SourceKind::Monthly => Self::Monthly(MonthlySchedulePages::default()),
            SourceKind::Static => Self::Static(load_table(table_path)?),
            SourceKind::Auto => Self::Auto(WithFallback::new(
                MonthlySchedulePages::default(),
                load_table(table_path)?,
            )),
        })
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Espn(_) => "ESPN schedule page",
            Self::Monthly(_) => "club month pages",
            Self::Static(_) => "home-game table",
            Self::Auto(_) => "club month pages, home-game table fallback",
        }
    }

    /// Warning to show when the rows came from a table that lists only part
    /// of the season.
    pub fn partial_notice(&self, season: i32, entries: &[RawScheduleEntry]) -> Option<String> {
        let table = match self {
            Self::Static(table) => table,
            Self::Auto(auto) => &auto.fallback,
            Self::Espn(_) | Self::Monthly(_) => return None,
        };
        table.served_partial(season, entries).then(|| {
            format!(
                "⚠ The {season} home-game table is partial ({} games). Pass --schedule-json with the full season to sync every home game.",
                entries.len()
            )
        })
    }
}

impl ScheduleSource for SelectedSource {
    async fn fetch_season_entries(&self, season: i32) -> ApiResult<Vec<RawScheduleEntry>> {
        match self {
            Self::Espn(s) => s.fetch_season_entries(season).await,
            Self::Monthly(s) => s.fetch_season_entries(season).await,
            Self::Static(s) => s.fetch_season_entries(season).await,
            Self::Auto(s) => s.fetch_season_entries(season).await,
        }
    }
}

fn load_table(path: Option<&Path>) -> ApiResult<StaticSchedule> {
    match path {
        Some(path) => StaticSchedule::from_file(path),
        None => StaticSchedule::embedded(),
    }
}
