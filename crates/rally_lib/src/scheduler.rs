//! Race lifecycle scheduler.
//!
//! Each tick does exactly one of: lock an expired OPEN race, materialize the
//! earliest due schedule into a new race, create a fallback race, or nothing.
//! The checks are state-gated, so redundant ticks are no-ops.

use crate::types::{Race, RaceStatus};
use crate::{game_config, races, schedules};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

/// Fallback voting-window length when no schedule is queued.
pub const DEFAULT_RACE_SECS: i64 = 600;

#[derive(Serialize, Clone, Debug)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RollOutcome {
    /// Voting window elapsed on the OPEN race; it is now LOCKED.
    Locked {
        #[serde(rename = "raceId")]
        race_id: String,
    },
    /// An active race exists and nothing needed to change.
    NoChange {
        #[serde(rename = "raceId")]
        race_id: String,
    },
    /// A due schedule was consumed into a new OPEN race.
    CreatedFromSchedule { race: Race },
    /// No race and no due schedule: a default race was created.
    Created { race: Race },
}

/// Advance the race state machine by one tick.
pub fn roll(conn: &mut Connection, now: i64) -> Result<RollOutcome> {
    let tx = conn.transaction()?;

    if let Some(active) = races::current(&tx)? {
        if active.status == RaceStatus::Open && now >= active.end_at {
            tx.execute("UPDATE races SET status = 'LOCKED' WHERE id = ?1", [&active.id])?;
            tx.commit()?;
            info!(race_id = %active.id, "voting closed, race locked");
            return Ok(RollOutcome::Locked { race_id: active.id });
        }
        tx.commit()?;
        return Ok(RollOutcome::NoChange { race_id: active.id });
    }

    let outcome = if let Some(schedule) = schedules::next_due(&tx, now)? {
        let race = create_race(&tx, schedule.scheduled_at, schedule.duration_secs, now)?;
        schedules::deactivate(&tx, schedule.id)?;
        info!(race_id = %race.id, schedule_id = schedule.id, "race created from schedule");
        RollOutcome::CreatedFromSchedule { race }
    } else {
        let race = create_race(&tx, now, DEFAULT_RACE_SECS, now)?;
        info!(race_id = %race.id, "default race created");
        RollOutcome::Created { race }
    };
    tx.commit()?;
    Ok(outcome)
}

fn create_race(conn: &Connection, start_at: i64, duration_secs: i64, now: i64) -> Result<Race> {
    let cfg = game_config::get_or_init(conn)?;
    let next_idx = cfg.last_race_number + 1;
    // The index suffix keeps ids unique even when two races land in the
    // same millisecond.
    let id = format!("race_{}_{}", chrono::Utc::now().timestamp_millis(), next_idx);
    let race = races::insert_open(conn, &id, start_at, start_at + duration_secs, next_idx, now)?;
    game_config::set_last_race_number(conn, next_idx)?;
    Ok(race)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage;

    #[test]
    fn locks_open_race_once_window_elapses() {
        let mut conn = storage::open_in_memory().unwrap();
        races::insert_open(&conn, "race_1", 1_000, 2_000, 1, 1_000).unwrap();

        // Before the close time: nothing changes.
        let out = roll(&mut conn, 1_500).unwrap();
        assert!(matches!(out, RollOutcome::NoChange { .. }));

        let out = roll(&mut conn, 2_000).unwrap();
        assert!(matches!(out, RollOutcome::Locked { ref race_id } if race_id == "race_1"));

        // Re-invocation after the lock is a no-op, not a second transition.
        let out = roll(&mut conn, 2_001).unwrap();
        assert!(matches!(out, RollOutcome::NoChange { .. }));
    }

    #[test]
    fn materializes_due_schedule_and_consumes_it() {
        let mut conn = storage::open_in_memory().unwrap();
        schedules::create(&mut conn, 5_000, 300, "admin_wallet", 4_000).unwrap();

        // Not due yet.
        let out = roll(&mut conn, 4_500).unwrap();
        let RollOutcome::Created { race } = out else {
            panic!("expected fallback race before the schedule is due");
        };
        // Fallback race occupies the active slot; settle it out of the way.
        conn.execute(
            "UPDATE races SET status = 'SETTLED', winner = 'JESSE' WHERE id = ?1",
            [&race.id],
        )
        .unwrap();

        let out = roll(&mut conn, 5_100).unwrap();
        let RollOutcome::CreatedFromSchedule { race } = out else {
            panic!("expected race from schedule");
        };
        assert_eq!(race.start_at, 5_000);
        assert_eq!(race.end_at, 5_300);
        assert_eq!(race.unique_idx, 2);

        let active: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM race_schedules WHERE is_active = 1",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(active, 0);

        let last: i64 = conn
            .query_row("SELECT last_race_number FROM config", [], |r| r.get(0))
            .unwrap();
        assert_eq!(last, 2);
    }

    #[test]
    fn double_tick_creates_no_duplicate_race() {
        let mut conn = storage::open_in_memory().unwrap();
        let out = roll(&mut conn, 1_000).unwrap();
        assert!(matches!(out, RollOutcome::Created { .. }));
        let out = roll(&mut conn, 1_000).unwrap();
        assert!(matches!(out, RollOutcome::NoChange { .. }));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM races", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn schema_forbids_two_active_races() {
        let conn = storage::open_in_memory().unwrap();
        races::insert_open(&conn, "race_1", 1_000, 2_000, 1, 1_000).unwrap();
        let err = races::insert_open(&conn, "race_2", 1_000, 2_000, 2, 1_000);
        assert!(err.is_err());
    }

    #[test]
    fn default_race_uses_fallback_window() {
        let mut conn = storage::open_in_memory().unwrap();
        let out = roll(&mut conn, 9_000).unwrap();
        let RollOutcome::Created { race } = out else {
            panic!("expected default race");
        };
        assert_eq!(race.start_at, 9_000);
        assert_eq!(race.end_at, 9_000 + DEFAULT_RACE_SECS);
        assert_eq!(race.unique_idx, 1);
    }
}
