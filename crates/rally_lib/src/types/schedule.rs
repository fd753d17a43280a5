use serde::Serialize;

/// A queued future race request, consumed exactly once by the scheduler.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RaceSchedule {
    pub id: i64,
    pub scheduled_at: i64,
    /// Voting window length in seconds, bounded [60, 3600].
    pub duration_secs: i64,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: i64,
}
