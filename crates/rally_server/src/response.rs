//! Uniform JSON envelope `{ok, data?, error?}` and error-to-status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rally_lib::payment::PaymentError;
use rally_lib::referral::ReferralError;
use rally_lib::schedules::ScheduleError;
use rally_lib::settlement::SettleError;
use rally_lib::votes::VoteError;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

pub fn ok_json<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "ok": true, "data": data }))
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "ok": false, "error": self.message }));
        (self.status, body).into_response()
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        error!(error = %err, "storage error");
        ApiError::internal("Internal error")
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!(error = %err, "internal error");
        ApiError::internal("Internal error")
    }
}

impl From<VoteError> for ApiError {
    fn from(err: VoteError) -> Self {
        match err {
            VoteError::RaceNotFound => ApiError::not_found(err.to_string()),
            VoteError::RaceNotOpen | VoteError::WindowClosed | VoteError::Payment(_) => {
                ApiError::bad_request(err.to_string())
            }
            VoteError::Storage(e) => e.into(),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        ApiError::bad_request(format!("Payment verification failed: {err}"))
    }
}

impl From<SettleError> for ApiError {
    fn from(err: SettleError) -> Self {
        match err {
            SettleError::RaceNotFound => ApiError::not_found(err.to_string()),
            SettleError::AlreadySettled => ApiError::bad_request(err.to_string()),
            SettleError::Storage(e) => e.into(),
        }
    }
}

impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::InvalidDuration => ApiError::bad_request(err.to_string()),
            ScheduleError::Storage(e) => e.into(),
        }
    }
}

impl From<ReferralError> for ApiError {
    fn from(err: ReferralError) -> Self {
        match err {
            ReferralError::UnknownCode
            | ReferralError::SelfReferral
            | ReferralError::AlreadyTracked => ApiError::bad_request(err.to_string()),
            ReferralError::Storage(e) => e.into(),
        }
    }
}
