//! Race schedule queue. At most one schedule is active at a time.

use crate::types::RaceSchedule;
use rusqlite::{Connection, OptionalExtension, Result as SqlResult, Row};
use thiserror::Error;

pub const MIN_DURATION_SECS: i64 = 60;
pub const MAX_DURATION_SECS: i64 = 3600;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Duration must be between {MIN_DURATION_SECS} and {MAX_DURATION_SECS} seconds")]
    InvalidDuration,
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

fn from_row(row: &Row<'_>) -> SqlResult<RaceSchedule> {
    Ok(RaceSchedule {
        id: row.get(0)?,
        scheduled_at: row.get(1)?,
        duration_secs: row.get(2)?,
        is_active: row.get::<_, i64>(3)? != 0,
        created_by: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const COLS: &str = "id, scheduled_at, duration_secs, is_active, created_by, created_at";

/// Queue a new schedule, deactivating every other one first.
pub fn create(
    conn: &mut Connection,
    scheduled_at: i64,
    duration_secs: i64,
    created_by: &str,
    now: i64,
) -> Result<RaceSchedule, ScheduleError> {
    if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&duration_secs) {
        return Err(ScheduleError::InvalidDuration);
    }
    let tx = conn.transaction()?;
    tx.execute("UPDATE race_schedules SET is_active = 0 WHERE is_active = 1", [])?;
    tx.execute(
        "INSERT INTO race_schedules (scheduled_at, duration_secs, is_active, created_by, created_at)
         VALUES (?1, ?2, 1, ?3, ?4)",
        rusqlite::params![scheduled_at, duration_secs, created_by, now],
    )?;
    let id = tx.last_insert_rowid();
    let schedule = tx.query_row(
        &format!("SELECT {COLS} FROM race_schedules WHERE id = ?1"),
        [id],
        from_row,
    )?;
    tx.commit()?;
    Ok(schedule)
}

/// Earliest active schedule, due or not.
pub fn next_active(conn: &Connection) -> SqlResult<Option<RaceSchedule>> {
    conn.query_row(
        &format!(
            "SELECT {COLS} FROM race_schedules WHERE is_active = 1
             ORDER BY scheduled_at ASC LIMIT 1"
        ),
        [],
        from_row,
    )
    .optional()
}

/// Earliest active schedule whose time has come.
pub fn next_due(conn: &Connection, now: i64) -> SqlResult<Option<RaceSchedule>> {
    conn.query_row(
        &format!(
            "SELECT {COLS} FROM race_schedules WHERE is_active = 1 AND scheduled_at <= ?1
             ORDER BY scheduled_at ASC LIMIT 1"
        ),
        [now],
        from_row,
    )
    .optional()
}

pub fn deactivate(conn: &Connection, schedule_id: i64) -> SqlResult<()> {
    conn.execute(
        "UPDATE race_schedules SET is_active = 0 WHERE id = ?1",
        [schedule_id],
    )?;
    Ok(())
}

pub fn deactivate_all(conn: &Connection) -> SqlResult<usize> {
    conn.execute("UPDATE race_schedules SET is_active = 0 WHERE is_active = 1", [])
}
