//! Settlement engine.
//!
//! Declares a race's winner, awards points and recomputes every voter's
//! accuracy and streak, all inside a single transaction. Correctness counts
//! and the returned stats are read after the race row is updated, inside the
//! same transaction, so reported stats always match what was persisted.

use crate::types::{Race, RaceStatus, Roach};
use crate::{game_config, races};
use rusqlite::{params_from_iter, Connection, Transaction};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SettleError {
    #[error("Race not found")]
    RaceNotFound,
    #[error("Race already settled")]
    AlreadySettled,
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettleStats {
    pub correct_votes: i64,
    pub total_votes: i64,
    pub points_awarded: i64,
}

/// Settle a race: record the winner, award points, refresh voter stats.
pub fn settle(
    conn: &mut Connection,
    race_id: &str,
    winner: Roach,
) -> Result<(Race, SettleStats), SettleError> {
    let tx = conn.transaction()?;

    let race = races::get(&tx, race_id)?.ok_or(SettleError::RaceNotFound)?;
    if race.status == RaceStatus::Settled {
        return Err(SettleError::AlreadySettled);
    }

    tx.execute(
        "UPDATE races SET status = 'SETTLED', winner = ?1 WHERE id = ?2",
        rusqlite::params![winner.as_str(), race_id],
    )?;

    let cfg = game_config::get_or_init(&tx)?;

    // (user_id, was this race's pick correct)
    let voters: Vec<(i64, bool)> = {
        let mut stmt = tx.prepare("SELECT user_id, pick FROM votes WHERE race_id = ?1")?;
        let rows = stmt.query_map([race_id], |row| {
            let user_id: i64 = row.get(0)?;
            let pick: String = row.get(1)?;
            Ok((user_id, pick == winner.as_str()))
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    };

    let correct_ids: Vec<i64> = voters
        .iter()
        .filter(|(_, correct)| *correct)
        .map(|(id, _)| *id)
        .collect();

    if !correct_ids.is_empty() {
        let placeholders = vec!["?"; correct_ids.len()].join(", ");
        let sql = format!(
            "UPDATE users SET points = points + ?1 WHERE id IN ({placeholders})"
        );
        let params = std::iter::once(cfg.points_per_correct).chain(correct_ids.iter().copied());
        // Placeholders after ?1 bind positionally to the id list.
        tx.execute(&sql, params_from_iter(params))?;
    }

    for (user_id, correct) in &voters {
        refresh_voter(&tx, *user_id, *correct, cfg.enable_streaks)?;
    }

    let stats = SettleStats {
        correct_votes: correct_ids.len() as i64,
        total_votes: voters.len() as i64,
        points_awarded: correct_ids.len() as i64 * cfg.points_per_correct,
    };
    let settled = races::get(&tx, race_id)?.ok_or(SettleError::RaceNotFound)?;
    tx.commit()?;

    info!(
        race_id,
        winner = %winner,
        correct = stats.correct_votes,
        total = stats.total_votes,
        points = stats.points_awarded,
        "race settled"
    );
    Ok((settled, stats))
}

/// Recompute one voter's all-time accuracy and streak.
///
/// Each voter's recompute reads only that voter's rows, so iteration order
/// over the race's votes cannot change the result.
fn refresh_voter(
    tx: &Transaction<'_>,
    user_id: i64,
    correct: bool,
    enable_streaks: bool,
) -> rusqlite::Result<()> {
    let total: i64 = tx.query_row(
        "SELECT COUNT(*) FROM votes WHERE user_id = ?1",
        [user_id],
        |r| r.get(0),
    )?;
    let correct_all_time: i64 = tx.query_row(
        "SELECT COUNT(*) FROM votes v JOIN races r ON r.id = v.race_id
         WHERE v.user_id = ?1 AND r.status = 'SETTLED'
           AND r.winner IS NOT NULL AND v.pick = r.winner",
        [user_id],
        |r| r.get(0),
    )?;
    let accuracy_pct = if total > 0 {
        correct_all_time as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    if enable_streaks {
        if correct {
            tx.execute(
                "UPDATE users SET accuracy_pct = ?1, streak = streak + 1 WHERE id = ?2",
                rusqlite::params![accuracy_pct, user_id],
            )?;
        } else {
            tx.execute(
                "UPDATE users SET accuracy_pct = ?1, streak = 0 WHERE id = ?2",
                rusqlite::params![accuracy_pct, user_id],
            )?;
        }
    } else {
        tx.execute(
            "UPDATE users SET accuracy_pct = ?1 WHERE id = ?2",
            rusqlite::params![accuracy_pct, user_id],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::User;
    use crate::{races, storage, users, votes};
    use rusqlite::Connection;

    fn user(conn: &Connection, wallet: &str) -> User {
        users::find_or_create(conn, wallet, 100).unwrap()
    }

    fn open_race(conn: &Connection, id: &str, idx: i64) {
        races::insert_open(conn, id, 1_000, 2_000, idx, 1_000).unwrap();
    }

    fn reload(conn: &Connection, id: i64) -> User {
        users::get(conn, id).unwrap().unwrap()
    }

    #[test]
    fn rejects_unknown_race() {
        let mut conn = storage::open_in_memory().unwrap();
        assert!(matches!(
            settle(&mut conn, "nope", Roach::Jesse),
            Err(SettleError::RaceNotFound)
        ));
    }

    #[test]
    fn awards_points_and_updates_streak_and_accuracy() {
        let mut conn = storage::open_in_memory().unwrap();
        let u1 = user(&conn, "u1");
        let u2 = user(&conn, "u2");
        let u3 = user(&conn, "u3");
        open_race(&conn, "race_1", 1);
        votes::cast(&mut conn, "race_1", u1.id, Roach::Jesse, "s1", 1_100).unwrap();
        votes::cast(&mut conn, "race_1", u2.id, Roach::Brian, "s2", 1_100).unwrap();
        votes::cast(&mut conn, "race_1", u3.id, Roach::Jesse, "s3", 1_100).unwrap();

        let (race, stats) = settle(&mut conn, "race_1", Roach::Jesse).unwrap();
        assert_eq!(race.status, RaceStatus::Settled);
        assert_eq!(race.winner, Some(Roach::Jesse));
        assert_eq!(
            stats,
            SettleStats {
                correct_votes: 2,
                total_votes: 3,
                points_awarded: 2,
            }
        );

        let u1 = reload(&conn, u1.id);
        assert_eq!(u1.points, 1);
        assert_eq!(u1.streak, 1);
        assert_eq!(u1.accuracy_pct, 100.0);

        let u2 = reload(&conn, u2.id);
        assert_eq!(u2.points, 0);
        assert_eq!(u2.streak, 0);
        assert_eq!(u2.accuracy_pct, 0.0);
    }

    #[test]
    fn second_settle_rejects_without_double_award() {
        let mut conn = storage::open_in_memory().unwrap();
        let u1 = user(&conn, "u1");
        open_race(&conn, "race_1", 1);
        votes::cast(&mut conn, "race_1", u1.id, Roach::Jesse, "s1", 1_100).unwrap();

        settle(&mut conn, "race_1", Roach::Jesse).unwrap();
        assert!(matches!(
            settle(&mut conn, "race_1", Roach::Jesse),
            Err(SettleError::AlreadySettled)
        ));
        assert_eq!(reload(&conn, u1.id).points, 1);
    }

    #[test]
    fn incorrect_vote_resets_streak_and_halves_accuracy() {
        let mut conn = storage::open_in_memory().unwrap();
        let u1 = user(&conn, "u1");

        open_race(&conn, "race_1", 1);
        votes::cast(&mut conn, "race_1", u1.id, Roach::Jesse, "s1", 1_100).unwrap();
        settle(&mut conn, "race_1", Roach::Jesse).unwrap();
        assert_eq!(reload(&conn, u1.id).streak, 1);

        open_race(&conn, "race_2", 2);
        votes::cast(&mut conn, "race_2", u1.id, Roach::Brian, "s2", 1_100).unwrap();
        settle(&mut conn, "race_2", Roach::Jesse).unwrap();

        let u1 = reload(&conn, u1.id);
        assert_eq!(u1.points, 1);
        assert_eq!(u1.streak, 0);
        assert_eq!(u1.accuracy_pct, 50.0);
    }

    #[test]
    fn incorrect_voters_are_refreshed_even_when_nobody_won() {
        let mut conn = storage::open_in_memory().unwrap();
        let u1 = user(&conn, "u1");
        conn.execute("UPDATE users SET streak = 3 WHERE id = ?1", [u1.id])
            .unwrap();
        open_race(&conn, "race_1", 1);
        votes::cast(&mut conn, "race_1", u1.id, Roach::Dale, "s1", 1_100).unwrap();

        let (_, stats) = settle(&mut conn, "race_1", Roach::Jesse).unwrap();
        assert_eq!(stats.correct_votes, 0);
        assert_eq!(stats.points_awarded, 0);
        assert_eq!(reload(&conn, u1.id).streak, 0);
    }

    #[test]
    fn respects_points_per_correct_from_config() {
        let mut conn = storage::open_in_memory().unwrap();
        game_config::get_or_init(&conn).unwrap();
        conn.execute("UPDATE config SET points_per_correct = 5", [])
            .unwrap();

        let u1 = user(&conn, "u1");
        open_race(&conn, "race_1", 1);
        votes::cast(&mut conn, "race_1", u1.id, Roach::Greg, "s1", 1_100).unwrap();

        let (_, stats) = settle(&mut conn, "race_1", Roach::Greg).unwrap();
        assert_eq!(stats.points_awarded, 5);
        assert_eq!(reload(&conn, u1.id).points, 5);
    }

    #[test]
    fn streaks_left_alone_when_disabled() {
        let mut conn = storage::open_in_memory().unwrap();
        game_config::get_or_init(&conn).unwrap();
        conn.execute("UPDATE config SET enable_streaks = 0", [])
            .unwrap();

        let u1 = user(&conn, "u1");
        open_race(&conn, "race_1", 1);
        votes::cast(&mut conn, "race_1", u1.id, Roach::Jesse, "s1", 1_100).unwrap();
        settle(&mut conn, "race_1", Roach::Jesse).unwrap();

        let u1 = reload(&conn, u1.id);
        assert_eq!(u1.streak, 0);
        assert_eq!(u1.points, 1);
        assert_eq!(u1.accuracy_pct, 100.0);
    }

    #[test]
    fn settles_a_locked_race() {
        let mut conn = storage::open_in_memory().unwrap();
        open_race(&conn, "race_1", 1);
        conn.execute("UPDATE races SET status = 'LOCKED' WHERE id = 'race_1'", [])
            .unwrap();
        let (race, _) = settle(&mut conn, "race_1", Roach::Dale).unwrap();
        assert_eq!(race.status, RaceStatus::Settled);
    }
}
