//! Singleton game configuration row, upsert-on-first-use.

use crate::types::GameConfig;
use rusqlite::{Connection, Result};

/// Fetch the config row, inserting defaults if it does not exist yet.
pub fn get_or_init(conn: &Connection) -> Result<GameConfig> {
    conn.execute(
        "INSERT OR IGNORE INTO config (id, points_per_correct, enable_streaks, last_race_number)
         VALUES (1, 1, 1, 0)",
        [],
    )?;
    conn.query_row(
        "SELECT points_per_correct, enable_streaks, last_race_number FROM config WHERE id = 1",
        [],
        |row| {
            Ok(GameConfig {
                points_per_correct: row.get(0)?,
                enable_streaks: row.get::<_, i64>(1)? != 0,
                last_race_number: row.get(2)?,
            })
        },
    )
}

/// Record a newly assigned race sequence number.
pub fn set_last_race_number(conn: &Connection, n: i64) -> Result<()> {
    conn.execute("UPDATE config SET last_race_number = ?1 WHERE id = 1", [n])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage;

    #[test]
    fn initializes_defaults_once() {
        let conn = storage::open_in_memory().unwrap();
        let cfg = get_or_init(&conn).unwrap();
        assert_eq!(cfg.points_per_correct, 1);
        assert!(cfg.enable_streaks);
        assert_eq!(cfg.last_race_number, 0);

        set_last_race_number(&conn, 7).unwrap();
        let cfg = get_or_init(&conn).unwrap();
        assert_eq!(cfg.last_race_number, 7);
    }
}
