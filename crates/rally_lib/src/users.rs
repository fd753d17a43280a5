//! User rows and read models (leaderboards, profile).

use crate::types::{RaceStatus, Roach, User};
use rand::{distributions::Alphanumeric, Rng};
use rusqlite::{Connection, OptionalExtension, Result, Row};
use serde::Serialize;

const COLS: &str = "id, wallet_address, points, accuracy_pct, streak, \
                    referral_code, referral_count, referral_points, created_at";

fn from_row(row: &Row<'_>) -> Result<User> {
    Ok(User {
        id: row.get(0)?,
        wallet_address: row.get(1)?,
        points: row.get(2)?,
        accuracy_pct: row.get(3)?,
        streak: row.get(4)?,
        referral_code: row.get(5)?,
        referral_count: row.get(6)?,
        referral_points: row.get(7)?,
        created_at: row.get(8)?,
    })
}

pub fn get(conn: &Connection, user_id: i64) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {COLS} FROM users WHERE id = ?1"),
        [user_id],
        from_row,
    )
    .optional()
}

pub fn find_by_wallet(conn: &Connection, wallet: &str) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {COLS} FROM users WHERE wallet_address = ?1"),
        [wallet],
        from_row,
    )
    .optional()
}

pub fn find_by_referral_code(conn: &Connection, code: &str) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {COLS} FROM users WHERE referral_code = ?1"),
        [code],
        from_row,
    )
    .optional()
}

/// Look up a user by wallet, creating the row on first sight.
pub fn find_or_create(conn: &Connection, wallet: &str, now: i64) -> Result<User> {
    conn.execute(
        "INSERT OR IGNORE INTO users (wallet_address, created_at) VALUES (?1, ?2)",
        rusqlite::params![wallet, now],
    )?;
    conn.query_row(
        &format!("SELECT {COLS} FROM users WHERE wallet_address = ?1"),
        [wallet],
        from_row,
    )
}

/// Short, stable referral code: wallet prefix plus a random suffix.
fn new_referral_code(wallet: &str) -> String {
    let prefix: String = wallet.chars().take(8).collect::<String>().to_uppercase();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(char::from)
        .collect::<String>()
        .to_uppercase();
    format!("{prefix}{suffix}")
}

/// Return the user's referral code, assigning one on first request.
pub fn assign_referral_code(conn: &Connection, user_id: i64, wallet: &str) -> Result<String> {
    let existing: Option<String> = conn.query_row(
        "SELECT referral_code FROM users WHERE id = ?1",
        [user_id],
        |r| r.get(0),
    )?;
    if let Some(code) = existing {
        return Ok(code);
    }
    let code = new_referral_code(wallet);
    conn.execute(
        "UPDATE users SET referral_code = ?1 WHERE id = ?2",
        rusqlite::params![code, user_id],
    )?;
    Ok(code)
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub rank: i64,
    pub wallet_address: String,
    pub points: i64,
    pub accuracy_pct: f64,
    pub streak: i64,
    pub total_votes: i64,
    pub joined_at: i64,
}

/// Ranked by points, then accuracy, then earliest join.
pub fn leaderboard(conn: &Connection, limit: i64) -> Result<Vec<LeaderboardRow>> {
    let mut stmt = conn.prepare(
        "SELECT u.wallet_address, u.points, u.accuracy_pct, u.streak,
                (SELECT COUNT(*) FROM votes v WHERE v.user_id = u.id), u.created_at
         FROM users u
         ORDER BY u.points DESC, u.accuracy_pct DESC, u.created_at ASC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map([limit], |row| {
        Ok(LeaderboardRow {
            rank: 0,
            wallet_address: row.get(0)?,
            points: row.get(1)?,
            accuracy_pct: row.get(2)?,
            streak: row.get(3)?,
            total_votes: row.get(4)?,
            joined_at: row.get(5)?,
        })
    })?;
    let mut out = Vec::new();
    for (i, row) in rows.enumerate() {
        let mut row = row?;
        row.rank = i as i64 + 1;
        out.push(row);
    }
    Ok(out)
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReferralLeaderboardRow {
    pub rank: i64,
    pub wallet_address: String,
    pub referral_count: i64,
    pub referral_points: i64,
}

pub fn referral_leaderboard(conn: &Connection, limit: i64) -> Result<Vec<ReferralLeaderboardRow>> {
    let mut stmt = conn.prepare(
        "SELECT wallet_address, referral_count, referral_points
         FROM users
         WHERE referral_count > 0
         ORDER BY referral_count DESC, referral_points DESC, created_at ASC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map([limit], |row| {
        Ok(ReferralLeaderboardRow {
            rank: 0,
            wallet_address: row.get(0)?,
            referral_count: row.get(1)?,
            referral_points: row.get(2)?,
        })
    })?;
    let mut out = Vec::new();
    for (i, row) in rows.enumerate() {
        let mut row = row?;
        row.rank = i as i64 + 1;
        out.push(row);
    }
    Ok(out)
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RecentVote {
    pub id: i64,
    pub pick: Roach,
    pub race_number: i64,
    pub race_status: RaceStatus,
    pub winner: Option<Roach>,
    pub is_correct: bool,
    pub created_at: i64,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub total_votes: i64,
    pub correct_votes: i64,
    pub accuracy_pct: f64,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,
    pub rank: i64,
    pub stats: ProfileStats,
    pub recent_votes: Vec<RecentVote>,
}

/// Full profile for `/user/me`: rank, all-time stats and recent votes.
pub fn profile(conn: &Connection, user_id: i64) -> Result<Option<Profile>> {
    let Some(user) = get(conn, user_id)? else {
        return Ok(None);
    };

    let higher: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE points > ?1",
        [user.points],
        |r| r.get(0),
    )?;
    let total_votes: i64 = conn.query_row(
        "SELECT COUNT(*) FROM votes WHERE user_id = ?1",
        [user_id],
        |r| r.get(0),
    )?;
    let correct_votes: i64 = conn.query_row(
        "SELECT COUNT(*) FROM votes v JOIN races r ON r.id = v.race_id
         WHERE v.user_id = ?1 AND r.status = 'SETTLED'
           AND r.winner IS NOT NULL AND v.pick = r.winner",
        [user_id],
        |r| r.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT v.id, v.pick, r.unique_idx, r.status, r.winner, v.created_at
         FROM votes v JOIN races r ON r.id = v.race_id
         WHERE v.user_id = ?1
         ORDER BY v.created_at DESC
         LIMIT 20",
    )?;
    let rows = stmt.query_map([user_id], |row| {
        let pick: String = row.get(1)?;
        let status: String = row.get(3)?;
        let winner: Option<String> = row.get(4)?;
        let pick = Roach::parse(&pick).unwrap_or(Roach::Jesse);
        let status = RaceStatus::parse(&status).unwrap_or(RaceStatus::Settled);
        let winner = winner.as_deref().and_then(Roach::parse);
        Ok(RecentVote {
            id: row.get(0)?,
            pick,
            race_number: row.get(2)?,
            race_status: status,
            winner,
            is_correct: status == RaceStatus::Settled && winner == Some(pick),
            created_at: row.get(5)?,
        })
    })?;
    let recent_votes = rows.collect::<Result<Vec<_>>>()?;

    let accuracy_pct = if total_votes > 0 {
        correct_votes as f64 / total_votes as f64 * 100.0
    } else {
        0.0
    };

    Ok(Some(Profile {
        user,
        rank: higher + 1,
        stats: ProfileStats {
            total_votes,
            correct_votes,
            accuracy_pct,
        },
        recent_votes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage;

    #[test]
    fn find_or_create_is_idempotent() {
        let conn = storage::open_in_memory().unwrap();
        let a = find_or_create(&conn, "WalletA", 10).unwrap();
        let b = find_or_create(&conn, "WalletA", 20).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(b.created_at, 10);
    }

    #[test]
    fn referral_code_is_stable_once_assigned() {
        let conn = storage::open_in_memory().unwrap();
        let u = find_or_create(&conn, "WalletABCDEFGH", 10).unwrap();
        let first = assign_referral_code(&conn, u.id, &u.wallet_address).unwrap();
        let second = assign_referral_code(&conn, u.id, &u.wallet_address).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("WALLETAB"));
        assert_eq!(first.len(), 12);
    }

    #[test]
    fn leaderboard_orders_by_points_accuracy_join_time() {
        let conn = storage::open_in_memory().unwrap();
        let a = find_or_create(&conn, "A", 10).unwrap();
        let b = find_or_create(&conn, "B", 20).unwrap();
        let c = find_or_create(&conn, "C", 30).unwrap();
        conn.execute(
            "UPDATE users SET points = 5, accuracy_pct = 50 WHERE id = ?1",
            [a.id],
        )
        .unwrap();
        conn.execute(
            "UPDATE users SET points = 5, accuracy_pct = 80 WHERE id = ?1",
            [b.id],
        )
        .unwrap();
        conn.execute("UPDATE users SET points = 9 WHERE id = ?1", [c.id])
            .unwrap();

        let rows = leaderboard(&conn, 100).unwrap();
        let wallets: Vec<&str> = rows.iter().map(|r| r.wallet_address.as_str()).collect();
        assert_eq!(wallets, vec!["C", "B", "A"]);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[2].rank, 3);
    }
}
