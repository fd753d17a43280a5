//! Current-race view, vote submission, and the scheduler roll hook.

use crate::response::{ok_json, ApiError};
use crate::session::{authenticate, require_auth, require_cron_secret};
use crate::SharedApp;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use rally_lib::types::Roach;
use rally_lib::{races, scheduler, schedules, votes};
use serde::Deserialize;
use serde_json::{json, Value};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

pub async fn current(
    State(app): State<SharedApp>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let auth = authenticate(&app, &headers).await?;
    let conn = app.db.lock().await;

    let Some(race) = races::current(&conn)? else {
        let next_schedule = schedules::next_active(&conn)?;
        return Ok(ok_json(json!({
            "race": null,
            "userVote": null,
            "nextSchedule": next_schedule,
        })));
    };

    let user_vote = match &auth {
        Some(a) => votes::for_user_in_race(&conn, &race.id, a.user_id)?
            .map(|v| json!({ "pick": v.pick, "createdAt": v.created_at })),
        None => None,
    };

    Ok(ok_json(json!({
        "race": race,
        "userVote": user_vote,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub race_id: String,
    pub pick: Roach,
    pub transaction_signature: String,
}

pub async fn vote(
    State(app): State<SharedApp>,
    headers: HeaderMap,
    Json(req): Json<VoteRequest>,
) -> Result<Json<Value>, ApiError> {
    let auth = require_auth(&app, &headers).await?;
    if req.transaction_signature.is_empty() {
        return Err(ApiError::bad_request("Transaction signature is required"));
    }

    // Race-side preconditions first, so an unusable race never costs a fee.
    {
        let conn = app.db.lock().await;
        votes::precheck(&conn, &req.race_id, Utc::now().timestamp())?;
    }

    let payer = Pubkey::from_str(&auth.wallet_address)
        .map_err(|_| ApiError::bad_request("Invalid wallet address"))?;
    let sig = req.transaction_signature.clone();
    let app_bg = app.clone();
    let verification = tokio::task::spawn_blocking(move || app_bg.verifier.verify(&payer, &sig))
        .await
        .map_err(|e| ApiError::internal(format!("Payment check did not complete: {e}")))?;
    verification?;

    let mut conn = app.db.lock().await;
    let vote = votes::cast(
        &mut conn,
        &req.race_id,
        auth.user_id,
        req.pick,
        &req.transaction_signature,
        Utc::now().timestamp(),
    )?;

    Ok(ok_json(json!({
        "vote": { "id": vote.id, "pick": vote.pick, "createdAt": vote.created_at },
        "message": "Vote recorded successfully",
    })))
}

pub async fn roll(
    State(app): State<SharedApp>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    require_cron_secret(&app, &headers)?;
    let mut conn = app.db.lock().await;
    let outcome = scheduler::roll(&mut conn, Utc::now().timestamp())?;
    Ok(ok_json(outcome))
}
