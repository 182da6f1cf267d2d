use jayscal_api::SyncOutcome;
use jayscal_api::sync::{GameReport, GameStatus};

const RULE_WIDTH: usize = 60;

pub fn print_banner(team: &str) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{team} Home Games Calendar Sync");
    println!("{}", "=".repeat(RULE_WIDTH));
}

pub fn print_game(report: &GameReport<'_>) {
    println!("{}", game_line(report));
}

pub fn game_line(report: &GameReport<'_>) -> String {
    let game = report.game;
    match &report.status {
        GameStatus::Added => format!(
            "  ✓ Added: {} on {}",
            report.title,
            game.starts_at().format("%a, %b %d at %I:%M %p")
        ),
        GameStatus::WouldAdd => format!(
            "  + Would add: {} on {}",
            report.title,
            game.starts_at().format("%a, %b %d at %I:%M %p")
        ),
        GameStatus::Skipped => format!(
            "  ⊘ Skipping: {} on {} (already exists)",
            report.title,
            game.date.format("%b %d")
        ),
        GameStatus::Failed(reason) => format!(
            "  ✗ Error adding {} on {}: {reason}",
            report.title,
            game.date.format("%b %d")
        ),
    }
}

pub fn print_summary(outcome: &SyncOutcome, dry_run: bool) {
    println!();
    println!("{}", "=".repeat(RULE_WIDTH));
    for line in summary_lines(outcome, dry_run) {
        println!("{line}");
    }
    println!("{}", "=".repeat(RULE_WIDTH));
}

pub fn summary_lines(outcome: &SyncOutcome, dry_run: bool) -> Vec<String> {
    let added_label = if dry_run { "Would be added" } else { "Successfully added" };
    vec![
        "Summary:".to_owned(),
        format!("  • Total home games found: {}", outcome.total),
        format!("  • {added_label}: {}", outcome.added),
        format!("  • Skipped (already exist): {}", outcome.skipped),
        format!("  • Failed: {}", outcome.failed),
    ]
}
