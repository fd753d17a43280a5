//! Standalone keeper that advances the race state machine on a fixed period,
//! for deployments without an external cron hitting `/races/roll`.

use anyhow::Result;
use chrono::Utc;
use rally_lib::{scheduler, storage};
use rally_server::config;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::load()?;
    rally_server::logging::init_tracing(&cfg);

    let period = Duration::from_secs(cfg.roll_period_secs);
    let start = Instant::now();
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut conn = storage::open(&cfg.database_path)?;
    info!(db = %cfg.database_path, period_secs = cfg.roll_period_secs, "roll keeper started");

    loop {
        ticker.tick().await;

        match scheduler::roll(&mut conn, Utc::now().timestamp()) {
            Ok(outcome) => {
                if !matches!(outcome, scheduler::RollOutcome::NoChange { .. }) {
                    info!(outcome = ?outcome, "roll tick applied");
                }
            }
            Err(e) => {
                error!(error = %e, "roll tick failed");
            }
        }
    }
}
