use serde::Serialize;

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub wallet_address: String,
    pub points: i64,
    /// Derived; recomputed at each settlement from historical votes.
    pub accuracy_pct: f64,
    /// Consecutive correct settled votes; reset on an incorrect one.
    pub streak: i64,
    pub referral_code: Option<String>,
    pub referral_count: i64,
    pub referral_points: i64,
    pub created_at: i64,
}
