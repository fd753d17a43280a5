use anyhow::{Context, Result};
use solana_commitment_config::CommitmentLevel;
use solana_sdk::pubkey::Pubkey;
use std::{env, str::FromStr};

#[derive(Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub database_path: String,
    pub public_base_url: String,

    pub solana_rpc_url: String,
    pub commitment: CommitmentLevel,
    pub rpc_timeout_ms: u64,

    pub payment_wallet: Pubkey,
    pub voting_fee_lamports: u64,
    pub payment_tolerance_lamports: u64,

    pub admin_wallets: Vec<String>,
    pub cron_secret: String,

    pub roll_period_secs: u64,

    pub log_level: String,
    pub log_format: String,
    pub log_color: bool,
}

pub fn load() -> Result<RuntimeConfig> {
    let _ = dotenvy::dotenv();

    let solana_rpc_url = env_str("SOLANA_RPC_URL", None).context("SOLANA_RPC_URL must be set")?;
    let payment_wallet = env_pubkey("PAYMENT_WALLET", None).context("PAYMENT_WALLET must be set")?;
    let cron_secret = env_str("CRON_SECRET", None).context("CRON_SECRET must be set")?;

    let commitment = env_commitment("COMMITMENT", Some(CommitmentLevel::Confirmed))
        .context("COMMITMENT must be one of finalized|confirmed|processed")?;
    let rpc_timeout_ms = env_u64("RPC_TIMEOUT_MS", Some(30_000)).context("RPC_TIMEOUT_MS")?;

    let voting_fee_lamports = env_u64("VOTING_FEE_LAMPORTS", Some(20_000_000))
        .context("VOTING_FEE_LAMPORTS")?;
    let payment_tolerance_lamports = env_u64("PAYMENT_TOLERANCE_LAMPORTS", Some(1_000_000))
        .context("PAYMENT_TOLERANCE_LAMPORTS")?;

    let admin_wallets = env_str("ADMIN_WALLETS", Some(String::new()))
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    Ok(RuntimeConfig {
        bind_addr: env_str("BIND_ADDR", Some("0.0.0.0:8080".into())).unwrap(),
        database_path: env_str("DATABASE_PATH", Some("data/rally.db".into())).unwrap(),
        public_base_url: env_str("PUBLIC_BASE_URL", Some("http://localhost:8080".into())).unwrap(),
        solana_rpc_url,
        commitment,
        rpc_timeout_ms,
        payment_wallet,
        voting_fee_lamports,
        payment_tolerance_lamports,
        admin_wallets,
        cron_secret,
        roll_period_secs: env_u64("ROLL_PERIOD_IN_SECS", Some(15)).unwrap(),
        log_level: env_str("LOG_LEVEL", Some("info".into())).unwrap(),
        log_format: env_str("LOG_FORMAT", Some("json".into())).unwrap(),
        log_color: env_bool("LOG_COLOR", Some(false)).unwrap(),
    })
}

fn env_str(key: &str, default: Option<String>) -> Option<String> {
    env::var(key).ok().or(default)
}

fn env_bool(key: &str, default: Option<bool>) -> Option<bool> {
    env::var(key).ok().and_then(|v| v.parse().ok()).or(default)
}

fn env_u64(key: &str, default: Option<u64>) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.parse().ok()).or(default)
}

fn env_pubkey(key: &str, default: Option<Pubkey>) -> Option<Pubkey> {
    env::var(key)
        .ok()
        .and_then(|v| Pubkey::from_str(&v).ok())
        .or(default)
}

fn env_commitment(key: &str, default: Option<CommitmentLevel>) -> Option<CommitmentLevel> {
    match env::var(key).unwrap_or_default().to_lowercase().as_str() {
        "finalized" => Some(CommitmentLevel::Finalized),
        "confirmed" => Some(CommitmentLevel::Confirmed),
        "processed" => Some(CommitmentLevel::Processed),
        _ => None,
    }
    .or(default)
}
