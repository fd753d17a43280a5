//! Domain library for the Roach Rally prediction game: entity types, SQLite
//! storage, payment verification against the Solana ledger, the vote ledger,
//! the race state machine and scheduler, the settlement engine and the
//! referral ledger.

pub mod client;
pub mod game_config;
pub mod payment;
pub mod races;
pub mod referral;
pub mod scheduler;
pub mod schedules;
pub mod sessions;
pub mod settlement;
pub mod storage;
pub mod types;
pub mod users;
pub mod votes;
pub mod wallet;
