pub mod admin;
pub mod auth;
pub mod leaderboard;
pub mod race;
pub mod referral;
pub mod user;
