use crate::response::{ok_json, ApiError};
use crate::SharedApp;
use axum::extract::{Query, State};
use axum::Json;
use rally_lib::users;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
}

pub async fn get(
    State(app): State<SharedApp>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<Value>, ApiError> {
    let limit = params.limit.unwrap_or(100).clamp(1, 500);
    let conn = app.db.lock().await;
    let rows = users::leaderboard(&conn, limit)?;
    Ok(ok_json(json!({ "leaderboard": rows })))
}
