use rusqlite::{Connection, Result};

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS races (
            id TEXT PRIMARY KEY,
            start_at INTEGER NOT NULL,                -- voting opens (unix secs)
            end_at INTEGER NOT NULL,                  -- voting closes (unix secs)
            status TEXT NOT NULL DEFAULT 'OPEN',      -- OPEN|LOCKED|SETTLED
            winner TEXT,                              -- JESSE|BRIAN|GREG|DALE
            unique_idx INTEGER NOT NULL UNIQUE,
            created_at INTEGER NOT NULL
        )
        "#,
        [],
    )?;

    // At most one race may be OPEN or LOCKED at any time: the indexed
    // expression is constant over the partial-index subset.
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_races_single_active
         ON races((status IN ('OPEN', 'LOCKED'))) WHERE status IN ('OPEN', 'LOCKED')",
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS race_schedules (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            scheduled_at INTEGER NOT NULL,
            duration_secs INTEGER NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_by TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_schedules_active
         ON race_schedules(is_active, scheduled_at)",
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            wallet_address TEXT NOT NULL UNIQUE,
            points INTEGER NOT NULL DEFAULT 0,
            accuracy_pct REAL NOT NULL DEFAULT 0,
            streak INTEGER NOT NULL DEFAULT 0,
            referral_code TEXT UNIQUE,
            referral_count INTEGER NOT NULL DEFAULT 0,
            referral_points INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS votes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            race_id TEXT NOT NULL REFERENCES races(id),
            user_id INTEGER NOT NULL REFERENCES users(id),
            pick TEXT NOT NULL,
            sig TEXT NOT NULL,                        -- payment tx signature
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE (race_id, user_id)
        )
        "#,
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_votes_user ON votes(user_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_votes_race ON votes(race_id)",
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS referrals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            referrer_code TEXT NOT NULL,
            referee_wallet TEXT NOT NULL,
            points_awarded INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE (referrer_code, referee_wallet)
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS config (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            points_per_correct INTEGER NOT NULL DEFAULT 1,
            enable_streaks INTEGER NOT NULL DEFAULT 1,
            last_race_number INTEGER NOT NULL DEFAULT 0
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id),
            wallet_address TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS auth_nonces (
            wallet_address TEXT PRIMARY KEY,
            nonce TEXT NOT NULL,
            issued_at INTEGER NOT NULL
        )
        "#,
        [],
    )?;

    Ok(())
}
