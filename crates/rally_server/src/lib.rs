use crate::config::RuntimeConfig;
use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use rally_lib::client::Rpc;
use rally_lib::payment::PaymentVerifier;
use rally_lib::storage;
use rusqlite::Connection;
use std::sync::Arc;
use tokio::sync::Mutex;

pub mod config;
pub mod logging;
pub mod response;
pub mod routes;
pub mod session;

pub struct App {
    pub db: Mutex<Connection>,
    pub verifier: PaymentVerifier,
    pub cfg: RuntimeConfig,
}

pub type SharedApp = Arc<App>;

impl App {
    pub fn init_from(cfg: RuntimeConfig) -> Result<SharedApp> {
        let conn = storage::open(&cfg.database_path)?;
        Ok(Self::with_connection(cfg, conn))
    }

    /// Assemble the app around an existing connection (tests use in-memory).
    pub fn with_connection(cfg: RuntimeConfig, conn: Connection) -> SharedApp {
        let rpc = Rpc::new(&cfg.solana_rpc_url, cfg.rpc_timeout_ms, cfg.commitment);
        let verifier = PaymentVerifier::new(
            rpc,
            cfg.payment_wallet,
            cfg.voting_fee_lamports,
            cfg.payment_tolerance_lamports,
        );
        Arc::new(App {
            db: Mutex::new(conn),
            verifier,
            cfg,
        })
    }

    pub fn is_admin(&self, wallet: &str) -> bool {
        self.cfg.admin_wallets.iter().any(|w| w == wallet)
    }
}

pub fn router(app: SharedApp) -> Router {
    Router::new()
        .route("/auth/nonce", post(routes::auth::nonce))
        .route("/auth/verify", post(routes::auth::verify))
        .route("/race/current", get(routes::race::current))
        .route("/race/vote", post(routes::race::vote))
        .route("/admin/settle", post(routes::admin::settle))
        .route(
            "/admin/schedule",
            get(routes::admin::get_schedule)
                .post(routes::admin::create_schedule)
                .delete(routes::admin::delete_schedule),
        )
        .route("/admin/check", post(routes::admin::check))
        .route("/races/roll", post(routes::race::roll))
        .route("/referral/track", post(routes::referral::track))
        .route("/referral/generate", post(routes::referral::generate))
        .route("/referral/leaderboard", get(routes::referral::leaderboard))
        .route("/leaderboard", get(routes::leaderboard::get))
        .route("/user/me", get(routes::user::me))
        .with_state(app)
}
