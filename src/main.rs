mod auth;
mod config;
mod report;
mod schedule;

use crate::config::{Cli, Settings};
use crate::schedule::SelectedSource;
use anyhow::Context;
use chrono::Local;
use clap::Parser;
use jayscal_api::TeamProfile;
use jayscal_api::calendar::GoogleCalendar;
use jayscal_api::normalize::normalize_all;
use jayscal_api::source::fetch_schedule;
use jayscal_api::sync::Synchronizer;
use log::LevelFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    better_panic::install();

    let settings = Settings::from_cli(Cli::parse(), Local::now().date_naive());
    init_logger(settings.log_level);

    let team = TeamProfile::blue_jays();
    let synchronizer = Synchronizer::new(team.clone())?
        .with_policy(settings.duplicates)
        .dry_run(settings.dry_run);

    report::print_banner(&team.name);

    // Credentials and schedule are both settled before the calendar is touched.
    let access_token = auth::acquire_access_token(settings.token_file.as_deref())
        .await
        .context("could not authorize the calendar client")?;
    println!("✓ Authorized for calendar {:?}", settings.calendar_id);

    let source = SelectedSource::new(settings.source, settings.schedule_json.as_deref())
        .context("could not set up the schedule source")?;
    println!("Fetching {} {} schedule from {}...", team.name, settings.season, source.describe());
    let entries = fetch_schedule(&source, settings.season)
        .await
        .with_context(|| format!("could not fetch the {} schedule", settings.season))?;
    if let Some(notice) = source.partial_notice(settings.season, &entries) {
        println!("{notice}");
    }

    let games = normalize_all(&entries, settings.season);
    println!("✓ Found {} home games", games.len());
    if games.is_empty() {
        println!("No home games found!");
        return Ok(());
    }

    let calendar = GoogleCalendar::new(access_token, settings.calendar_id.clone());
    println!("\nAdding {} home games to calendar...", games.len());
    let outcome = synchronizer
        .sync(&games, &calendar, |game| report::print_game(&game))
        .await;

    report::print_summary(&outcome, settings.dry_run);
    Ok(())
}

fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}
