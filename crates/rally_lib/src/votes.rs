//! Vote ledger: one row per (race, user), upserted while the race is OPEN.

use crate::payment::PaymentError;
use crate::races;
use crate::types::{Race, RaceStatus, Roach, Vote};
use rusqlite::{Connection, OptionalExtension, Result as SqlResult, Row};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("Race not found")]
    RaceNotFound,
    #[error("Race is not open for voting")]
    RaceNotOpen,
    #[error("Voting window has closed")]
    WindowClosed,
    #[error("Payment verification failed: {0}")]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

fn vote_from_row(row: &Row<'_>) -> SqlResult<Vote> {
    let pick: String = row.get(3)?;
    Ok(Vote {
        id: row.get(0)?,
        race_id: row.get(1)?,
        user_id: row.get(2)?,
        pick: Roach::parse(&pick).unwrap_or(Roach::Jesse),
        sig: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

const COLS: &str = "id, race_id, user_id, pick, sig, created_at, updated_at";

fn check_race(race: Option<Race>, now: i64) -> Result<Race, VoteError> {
    let race = race.ok_or(VoteError::RaceNotFound)?;
    if race.status != RaceStatus::Open {
        return Err(VoteError::RaceNotOpen);
    }
    if now > race.end_at {
        return Err(VoteError::WindowClosed);
    }
    Ok(race)
}

/// Validate the race-side preconditions before paying for a vote.
///
/// The same checks run again inside [`cast`]; this exists so callers can
/// reject early without burning a payment on a race that cannot accept votes.
pub fn precheck(conn: &Connection, race_id: &str, now: i64) -> Result<Race, VoteError> {
    check_race(races::get(conn, race_id)?, now)
}

/// Record or overwrite the caller's vote for a race.
///
/// Race state is re-checked inside the same transaction as the write, so a
/// vote can never land on a race that was locked or settled in between.
pub fn cast(
    conn: &mut Connection,
    race_id: &str,
    user_id: i64,
    pick: Roach,
    sig: &str,
    now: i64,
) -> Result<Vote, VoteError> {
    let tx = conn.transaction()?;
    check_race(races::get(&tx, race_id)?, now)?;

    tx.execute(
        "INSERT INTO votes (race_id, user_id, pick, sig, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)
         ON CONFLICT (race_id, user_id)
         DO UPDATE SET pick = excluded.pick, sig = excluded.sig, updated_at = excluded.updated_at",
        rusqlite::params![race_id, user_id, pick.as_str(), sig, now],
    )?;
    let vote = tx.query_row(
        &format!("SELECT {COLS} FROM votes WHERE race_id = ?1 AND user_id = ?2"),
        rusqlite::params![race_id, user_id],
        vote_from_row,
    )?;
    tx.commit()?;
    Ok(vote)
}

pub fn for_user_in_race(
    conn: &Connection,
    race_id: &str,
    user_id: i64,
) -> SqlResult<Option<Vote>> {
    conn.query_row(
        &format!("SELECT {COLS} FROM votes WHERE race_id = ?1 AND user_id = ?2"),
        rusqlite::params![race_id, user_id],
        vote_from_row,
    )
    .optional()
}
