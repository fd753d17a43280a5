//! Admin surface: settlement, schedule management, allow-list check.

use crate::response::{ok_json, ApiError};
use crate::session::require_admin;
use crate::SharedApp;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use rally_lib::types::Roach;
use rally_lib::{schedules, settlement};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleRequest {
    pub race_id: String,
    pub winner: Roach,
}

pub async fn settle(
    State(app): State<SharedApp>,
    headers: HeaderMap,
    Json(req): Json<SettleRequest>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&app, &headers).await?;
    let mut conn = app.db.lock().await;
    let (race, stats) = settlement::settle(&mut conn, &req.race_id, req.winner)?;

    Ok(ok_json(json!({
        "race": { "id": race.id, "status": race.status, "winner": race.winner },
        "stats": stats,
        "message": "Race settled successfully",
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    /// RFC 3339 datetime.
    pub scheduled_at: String,
    #[serde(default = "default_duration")]
    pub duration: i64,
}

fn default_duration() -> i64 {
    600
}

pub async fn create_schedule(
    State(app): State<SharedApp>,
    headers: HeaderMap,
    Json(req): Json<ScheduleRequest>,
) -> Result<Json<Value>, ApiError> {
    let auth = require_admin(&app, &headers).await?;
    let scheduled_at = DateTime::parse_from_rfc3339(&req.scheduled_at)
        .map_err(|_| ApiError::bad_request("Invalid datetime format"))?
        .timestamp();

    let mut conn = app.db.lock().await;
    let schedule = schedules::create(
        &mut conn,
        scheduled_at,
        req.duration,
        &auth.wallet_address,
        Utc::now().timestamp(),
    )?;
    Ok(ok_json(json!({ "schedule": schedule })))
}

pub async fn get_schedule(
    State(app): State<SharedApp>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    require_admin(&app, &headers).await?;
    let conn = app.db.lock().await;
    let next = schedules::next_active(&conn)?;
    Ok(ok_json(json!({ "nextSchedule": next })))
}

pub async fn delete_schedule(
    State(app): State<SharedApp>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    require_admin(&app, &headers).await?;
    let conn = app.db.lock().await;
    schedules::deactivate_all(&conn)?;
    Ok(ok_json(json!({ "message": "All schedules deactivated" })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    pub wallet_address: String,
}

pub async fn check(
    State(app): State<SharedApp>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.wallet_address.is_empty() {
        return Err(ApiError::bad_request("Wallet address is required"));
    }
    Ok(ok_json(json!({ "isAdmin": app.is_admin(&req.wallet_address) })))
}
