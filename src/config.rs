use chrono::{Datelike, NaiveDate};
use clap::{ArgAction, Parser, ValueEnum};
use jayscal_api::sync::DuplicatePolicy;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "jayscal", version)]
#[command(about = "Add Blue Jays home games to your Google Calendar", long_about = None)]
pub struct Cli {
    /// Season to synchronize (defaults to the current year)
    #[arg(long, value_name = "YEAR")]
    pub season: Option<i32>,

    /// Where the schedule comes from
    #[arg(long, value_enum, default_value_t = SourceKind::Auto)]
    pub source: SourceKind,

    /// Calendar to write to
    #[arg(long, env = "JAYSCAL_CALENDAR_ID", default_value = "primary")]
    pub calendar: String,

    /// How existing entries are detected
    #[arg(long, value_enum, default_value_t = DuplicateMode::Query)]
    pub duplicates: DuplicateMode,

    /// Check the calendar but do not add anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// OAuth token file (defaults to token.json in the config directory)
    #[arg(long, env = "JAYSCAL_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    /// Home-game table to use instead of the built-in one
    #[arg(long, env = "JAYSCAL_SCHEDULE_JSON")]
    pub schedule_json: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Month pages, falling back to the home-game table
    Auto,
    /// ESPN team schedule page
    Espn,
    /// Club month pages only
    Monthly,
    /// Home-game table only
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DuplicateMode {
    /// Search the calendar for the same matchup on the same day
    Query,
    /// Do not check
    Off,
}

impl From<DuplicateMode> for DuplicatePolicy {
    fn from(mode: DuplicateMode) -> Self {
        match mode {
            DuplicateMode::Query => DuplicatePolicy::Query,
            DuplicateMode::Off => DuplicatePolicy::Off,
        }
    }
}

/// Resolved run settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub season: i32,
    pub source: SourceKind,
    pub calendar_id: String,
    pub duplicates: DuplicatePolicy,
    pub dry_run: bool,
    pub token_file: Option<PathBuf>,
    pub schedule_json: Option<PathBuf>,
    pub log_level: LevelFilter,
}

impl Settings {
    pub fn from_cli(cli: Cli, today: NaiveDate) -> Self {
        Self {
            season: cli.season.unwrap_or_else(|| today.year()),
            source: cli.source,
            calendar_id: cli.calendar,
            duplicates: cli.duplicates.into(),
            dry_run: cli.dry_run,
            token_file: cli.token_file,
            schedule_json: cli.schedule_json,
            log_level: match cli.verbose {
                0 => LevelFilter::Warn,
                1 => LevelFilter::Info,
                _ => LevelFilter::Debug,
            },
        }
    }
}
