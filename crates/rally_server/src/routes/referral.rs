use crate::response::{ok_json, ApiError};
use crate::session::require_auth;
use crate::SharedApp;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use rally_lib::{referral, users};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    pub referral_code: String,
    pub referee_wallet: String,
}

pub async fn track(
    State(app): State<SharedApp>,
    Json(req): Json<TrackRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.referral_code.is_empty() || req.referee_wallet.is_empty() {
        return Err(ApiError::bad_request(
            "Referral code and referee wallet are required",
        ));
    }
    let mut conn = app.db.lock().await;
    let award = referral::track(
        &mut conn,
        &req.referral_code,
        &req.referee_wallet,
        Utc::now().timestamp(),
    )?;
    Ok(ok_json(award))
}

pub async fn generate(
    State(app): State<SharedApp>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let auth = require_auth(&app, &headers).await?;
    let conn = app.db.lock().await;
    let code = users::assign_referral_code(&conn, auth.user_id, &auth.wallet_address)?;
    let link = format!("{}?ref={}", app.cfg.public_base_url, code);
    Ok(ok_json(json!({
        "referralCode": code,
        "referralLink": link,
    })))
}

#[derive(Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
}

pub async fn leaderboard(
    State(app): State<SharedApp>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<Value>, ApiError> {
    let limit = params.limit.unwrap_or(100).clamp(1, 500);
    let conn = app.db.lock().await;
    let rows = users::referral_leaderboard(&conn, limit)?;
    Ok(ok_json(json!({ "leaderboard": rows })))
}
