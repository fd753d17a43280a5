use serde::Serialize;

/// Singleton configuration row (id = 1), created on first use.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub points_per_correct: i64,
    pub enable_streaks: bool,
    /// Source of the next race `unique_idx`.
    pub last_race_number: i64,
}
