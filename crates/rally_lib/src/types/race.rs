use crate::types::enums::{RaceStatus, Roach};
use serde::Serialize;

/// One timed round of voting plus its settlement outcome.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: String,
    /// Voting window opens (unix seconds).
    pub start_at: i64,
    /// Voting window closes (unix seconds).
    pub end_at: i64,
    pub status: RaceStatus,
    pub winner: Option<Roach>,
    /// Monotonically increasing race sequence number.
    pub unique_idx: i64,
    pub created_at: i64,
}
