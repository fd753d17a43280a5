use crate::response::{ok_json, ApiError};
use crate::session::authenticate;
use crate::SharedApp;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use rally_lib::users;
use serde_json::{json, Value};

pub async fn me(
    State(app): State<SharedApp>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let Some(auth) = authenticate(&app, &headers).await? else {
        return Ok(ok_json(json!({ "user": null })));
    };

    let conn = app.db.lock().await;
    let profile = users::profile(&conn, auth.user_id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ok_json(json!({ "user": profile })))
}
