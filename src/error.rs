use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::models::pickup::PickupStatus;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: PickupStatus, to: PickupStatus },

    #[error("email address is not verified")]
    EmailNotVerified,

    #[error("verification token has expired")]
    TokenExpired,

    #[error("email address is already verified")]
    AlreadyVerified,

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::InvalidTransition { from, to } => (
                StatusCode::CONFLICT,
                format!("cannot move request from {from} to {to}"),
            ),
            AppError::EmailNotVerified => (
                StatusCode::FORBIDDEN,
                "email address is not verified".to_string(),
            ),
            AppError::TokenExpired => (
                StatusCode::GONE,
                "verification token has expired".to_string(),
            ),
            AppError::AlreadyVerified => (
                StatusCode::CONFLICT,
                "email address is already verified".to_string(),
            ),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
