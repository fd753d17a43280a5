use crate::types::enums::Roach;
use serde::Serialize;

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: i64,
    pub race_id: String,
    pub user_id: i64,
    pub pick: Roach,
    /// Payment transaction signature carried as proof-of-payment.
    pub sig: String,
    pub created_at: i64,
    pub updated_at: i64,
}
