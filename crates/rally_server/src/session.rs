//! Bearer-token identity helpers shared by the route handlers.

use crate::response::ApiError;
use crate::App;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use chrono::Utc;
use rally_lib::sessions;

#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub wallet_address: String,
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the caller's session, if any.
pub async fn authenticate(app: &App, headers: &HeaderMap) -> Result<Option<AuthUser>, ApiError> {
    let Some(token) = bearer_token(headers) else {
        return Ok(None);
    };
    let conn = app.db.lock().await;
    let record = sessions::get(&conn, token, Utc::now().timestamp())?;
    Ok(record.map(|s| AuthUser {
        user_id: s.user_id,
        wallet_address: s.wallet_address,
    }))
}

pub async fn require_auth(app: &App, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    authenticate(app, headers)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))
}

pub async fn require_admin(app: &App, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let auth = require_auth(app, headers).await?;
    if !app.is_admin(&auth.wallet_address) {
        return Err(ApiError::forbidden("Admin access required"));
    }
    Ok(auth)
}

/// The scheduler-roll endpoint is protected by a static secret, not a session.
pub fn require_cron_secret(app: &App, headers: &HeaderMap) -> Result<(), ApiError> {
    match bearer_token(headers) {
        Some(token) if !app.cfg.cron_secret.is_empty() && token == app.cfg.cron_secret => Ok(()),
        _ => Err(ApiError::unauthorized("Unauthorized")),
    }
}
