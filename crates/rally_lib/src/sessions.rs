//! Nonce challenges and opaque bearer sessions.

use rand::{distributions::Alphanumeric, Rng};
use rusqlite::{Connection, OptionalExtension, Result};

/// Sessions live for seven days.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 3600;

#[derive(Clone, Debug)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: i64,
    pub wallet_address: String,
    pub expires_at: i64,
}

fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Issue (or replace) the signing nonce for a wallet.
pub fn issue_nonce(conn: &Connection, wallet: &str, now: i64) -> Result<String> {
    let nonce = random_string(24);
    conn.execute(
        "INSERT INTO auth_nonces (wallet_address, nonce, issued_at) VALUES (?1, ?2, ?3)
         ON CONFLICT (wallet_address) DO UPDATE SET nonce = excluded.nonce,
                                                    issued_at = excluded.issued_at",
        rusqlite::params![wallet, nonce, now],
    )?;
    Ok(nonce)
}

/// Consume the nonce for a wallet: a nonce verifies at most one sign-in.
pub fn take_nonce(conn: &Connection, wallet: &str) -> Result<Option<String>> {
    let nonce: Option<String> = conn
        .query_row(
            "SELECT nonce FROM auth_nonces WHERE wallet_address = ?1",
            [wallet],
            |r| r.get(0),
        )
        .optional()?;
    if nonce.is_some() {
        conn.execute("DELETE FROM auth_nonces WHERE wallet_address = ?1", [wallet])?;
    }
    Ok(nonce)
}

/// Create a new bearer session for a user.
pub fn create(conn: &Connection, user_id: i64, wallet: &str, now: i64) -> Result<String> {
    let token = random_string(48);
    conn.execute(
        "INSERT INTO sessions (token, user_id, wallet_address, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![token, user_id, wallet, now, now + SESSION_TTL_SECS],
    )?;
    Ok(token)
}

/// Look up a live session; expired tokens resolve to `None`.
pub fn get(conn: &Connection, token: &str, now: i64) -> Result<Option<SessionRecord>> {
    conn.query_row(
        "SELECT token, user_id, wallet_address, expires_at FROM sessions
         WHERE token = ?1 AND expires_at > ?2",
        rusqlite::params![token, now],
        |row| {
            Ok(SessionRecord {
                token: row.get(0)?,
                user_id: row.get(1)?,
                wallet_address: row.get(2)?,
                expires_at: row.get(3)?,
            })
        },
    )
    .optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{storage, users};

    #[test]
    fn nonce_is_single_use() {
        let conn = storage::open_in_memory().unwrap();
        let nonce = issue_nonce(&conn, "w1", 100).unwrap();
        assert_eq!(take_nonce(&conn, "w1").unwrap(), Some(nonce));
        assert_eq!(take_nonce(&conn, "w1").unwrap(), None);
    }

    #[test]
    fn reissue_replaces_previous_nonce() {
        let conn = storage::open_in_memory().unwrap();
        let first = issue_nonce(&conn, "w1", 100).unwrap();
        let second = issue_nonce(&conn, "w1", 200).unwrap();
        assert_ne!(first, second);
        assert_eq!(take_nonce(&conn, "w1").unwrap(), Some(second));
    }

    #[test]
    fn session_expires() {
        let conn = storage::open_in_memory().unwrap();
        let u = users::find_or_create(&conn, "w1", 100).unwrap();
        let token = create(&conn, u.id, "w1", 1_000).unwrap();

        let live = get(&conn, &token, 1_000 + SESSION_TTL_SECS - 1).unwrap();
        assert_eq!(live.unwrap().user_id, u.id);

        let dead = get(&conn, &token, 1_000 + SESSION_TTL_SECS).unwrap();
        assert!(dead.is_none());
    }
}
