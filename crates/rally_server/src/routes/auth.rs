//! Wallet sign-in: nonce challenge, signature verification, session issuance.

use crate::response::{ok_json, ApiError};
use crate::SharedApp;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use rally_lib::{referral, sessions, users, wallet};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonceRequest {
    pub wallet_address: String,
}

pub async fn nonce(
    State(app): State<SharedApp>,
    Json(req): Json<NonceRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.wallet_address.is_empty() {
        return Err(ApiError::bad_request("Wallet address is required"));
    }
    let conn = app.db.lock().await;
    let nonce = sessions::issue_nonce(&conn, &req.wallet_address, Utc::now().timestamp())?;
    Ok(ok_json(json!({ "nonce": nonce })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub wallet_address: String,
    pub nonce: String,
    pub signature: String,
    pub referral_code: Option<String>,
}

pub async fn verify(
    State(app): State<SharedApp>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<Value>, ApiError> {
    let now = Utc::now().timestamp();
    let mut conn = app.db.lock().await;

    let issued = sessions::take_nonce(&conn, &req.wallet_address)?;
    if issued.as_deref() != Some(req.nonce.as_str()) {
        return Err(ApiError::unauthorized("Unknown or expired nonce"));
    }
    if !wallet::verify_wallet_signature(&req.wallet_address, &req.nonce, &req.signature) {
        return Err(ApiError::unauthorized("Signature verification failed"));
    }

    let is_new_user = users::find_by_wallet(&conn, &req.wallet_address)?.is_none();
    let user = users::find_or_create(&conn, &req.wallet_address, now)?;

    // Referral attribution is best-effort; a bad code never blocks sign-in.
    if is_new_user {
        if let Some(code) = req.referral_code.as_deref() {
            match referral::track(&mut conn, code, &req.wallet_address, now) {
                Ok(award) => info!(
                    wallet = %req.wallet_address,
                    points = award.points_awarded,
                    "referral tracked at sign-in"
                ),
                Err(err) => warn!(
                    wallet = %req.wallet_address,
                    error = %err,
                    "referral attribution skipped"
                ),
            }
        }
    }

    let token = sessions::create(&conn, user.id, &req.wallet_address, now)?;
    Ok(ok_json(json!({
        "token": token,
        "walletAddress": req.wallet_address,
        "isNewUser": is_new_user,
        "message": "Authentication successful",
    })))
}
