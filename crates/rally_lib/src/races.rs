//! Race row queries shared by the scheduler, vote ledger and settlement.

use crate::types::{Race, RaceStatus, Roach};
use rusqlite::{Connection, OptionalExtension, Result, Row};

pub(crate) fn from_row(row: &Row<'_>) -> Result<Race> {
    let status: String = row.get(3)?;
    let winner: Option<String> = row.get(4)?;
    Ok(Race {
        id: row.get(0)?,
        start_at: row.get(1)?,
        end_at: row.get(2)?,
        status: RaceStatus::parse(&status).unwrap_or(RaceStatus::Settled),
        winner: winner.as_deref().and_then(Roach::parse),
        unique_idx: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const COLS: &str = "id, start_at, end_at, status, winner, unique_idx, created_at";

pub fn get(conn: &Connection, race_id: &str) -> Result<Option<Race>> {
    conn.query_row(
        &format!("SELECT {COLS} FROM races WHERE id = ?1"),
        [race_id],
        from_row,
    )
    .optional()
}

/// The single OPEN or LOCKED race, if any.
pub fn current(conn: &Connection) -> Result<Option<Race>> {
    conn.query_row(
        &format!(
            "SELECT {COLS} FROM races WHERE status IN ('OPEN', 'LOCKED')
             ORDER BY created_at DESC LIMIT 1"
        ),
        [],
        from_row,
    )
    .optional()
}

/// Insert a new OPEN race with the given voting window and sequence number.
pub fn insert_open(
    conn: &Connection,
    id: &str,
    start_at: i64,
    end_at: i64,
    unique_idx: i64,
    now: i64,
) -> Result<Race> {
    conn.execute(
        "INSERT INTO races (id, start_at, end_at, status, unique_idx, created_at)
         VALUES (?1, ?2, ?3, 'OPEN', ?4, ?5)",
        rusqlite::params![id, start_at, end_at, unique_idx, now],
    )?;
    Ok(Race {
        id: id.to_string(),
        start_at,
        end_at,
        status: RaceStatus::Open,
        winner: None,
        unique_idx,
        created_at: now,
    })
}
