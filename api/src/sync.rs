use crate::calendar::{CalendarService, EventQuery};
use crate::{ApiError, ApiResult, CalendarEventDraft, NormalizedGame, SyncOutcome, TeamProfile};
use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::{debug, error, info};

/// How to decide that a game is already on the calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Look for an event on the game's local day whose text matches the title.
    #[default]
    Query,
    /// Never look; rely on the calendar to suppress identical payloads.
    Off,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameStatus {
    Added,
    /// Dry run: the game would have been added.
    WouldAdd,
    Skipped,
    Failed(String),
}

/// Progress for one game, handed to the caller as soon as it is known.
#[derive(Debug, Clone)]
pub struct GameReport<'a> {
    pub game: &'a NormalizedGame,
    pub title: String,
    pub status: GameStatus,
}

#[derive(Debug, Clone)]
pub struct Synchronizer {
    team: TeamProfile,
    time_zone: Tz,
    policy: DuplicatePolicy,
    dry_run: bool,
}

impl Synchronizer {
    pub fn new(team: TeamProfile) -> ApiResult<Self> {
        let time_zone = team
            .timezone
            .parse::<Tz>()
            .map_err(|e| ApiError::Other(format!("unknown timezone {:?}: {e}", team.timezone)))?;
        Ok(Self {
            team,
            time_zone,
            policy: DuplicatePolicy::default(),
            dry_run: false,
        })
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Is there already an entry for this opponent on this (local) day?
    pub async fn exists<C: CalendarService>(
        &self,
        calendar: &C,
        opponent: &str,
        date: NaiveDate,
    ) -> ApiResult<bool> {
        if self.policy == DuplicatePolicy::Off {
            return Ok(false);
        }

        let (time_min, time_max) = local_day_bounds(self.time_zone, date);
        let query = EventQuery {
            time_min,
            time_max,
            text: self.team.title_against(opponent),
        };
        // The calendar returns anything overlapping the window, so a late game
        // the night before shows up too. Only events starting on this day count.
        let found = calendar
            .list_events(&query)
            .await?
            .into_iter()
            .filter(|e| e.start.is_none_or(|at| at >= time_min && at <= time_max))
            .count();
        debug!("{found} existing event(s) for {:?} on {date}", query.text);
        Ok(found > 0)
    }

    /// Add every game that is not already on the calendar, one at a time and
    /// in order. A failure only affects its own game.
    pub async fn sync<C, F>(&self, games: &[NormalizedGame], calendar: &C, mut on_game: F) -> SyncOutcome
    where
        C: CalendarService,
        F: FnMut(GameReport<'_>),
    {
        let mut outcome = SyncOutcome { total: games.len(), ..SyncOutcome::default() };

        for game in games {
            let status = self.sync_game(game, calendar).await;
            match &status {
                GameStatus::Added | GameStatus::WouldAdd => outcome.added += 1,
                GameStatus::Skipped => outcome.skipped += 1,
                GameStatus::Failed(_) => outcome.failed += 1,
            }
            on_game(GameReport {
                game,
                title: self.team.title_against(&game.opponent),
                status,
            });
        }

        info!(
            "sync complete: {} total, {} added, {} skipped, {} failed",
            outcome.total, outcome.added, outcome.skipped, outcome.failed
        );
        outcome
    }

    async fn sync_game<C: CalendarService>(&self, game: &NormalizedGame, calendar: &C) -> GameStatus {
        match self.exists(calendar, &game.opponent, game.date).await {
            Ok(true) => {
                info!("skipping {} on {}: already on calendar", game.opponent, game.date);
                return GameStatus::Skipped;
            }
            Ok(false) => {}
            Err(e) => {
                error!("duplicate check failed for {} on {}: {e}", game.opponent, game.date);
                return GameStatus::Failed(e.to_string());
            }
        }

        let draft = CalendarEventDraft::for_game(&self.team, game);
        if self.dry_run {
            info!("dry run: would add {:?} at {}", draft.title, draft.start);
            return GameStatus::WouldAdd;
        }

        match calendar.insert_event(&draft).await {
            Ok(created) => {
                debug!("created event {} for {} on {}", created.id, game.opponent, game.date);
                GameStatus::Added
            }
            Err(e) => {
                error!("failed to add {} on {}: {e}", game.opponent, game.date);
                GameStatus::Failed(e.to_string())
            }
        }
    }
}

/// Local midnight and 23:59:59 of `date` in `tz`, as UTC instants.
pub fn local_day_bounds(tz: Tz, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = to_utc(tz, date.and_time(NaiveTime::MIN));
    let end = to_utc(tz, date.and_hms_opt(23, 59, 59).unwrap_or(date.and_time(NaiveTime::MIN)));
    (start, end)
}

fn to_utc(tz: Tz, local: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(t) => t.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // Wall-clock reading falls in a DST gap; take it as UTC.
        LocalResult::None => Utc.from_utc_datetime(&local),
    }
}
