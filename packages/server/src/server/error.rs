//! API error rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::domains::pass::{PassError, Rejection};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthenticated: Valid JWT required")]
    Unauthenticated,

    #[error("Unauthorized: {0}")]
    Forbidden(&'static str),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Pass(#[from] PassError),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Pass(err) => match err.rejection() {
                Rejection::InvalidCredential => (StatusCode::NOT_FOUND, "invalid_or_expired"),
                Rejection::AlreadyRedeemed => (StatusCode::CONFLICT, "already_redeemed"),
                Rejection::NoRemainingUses => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "no_remaining_uses")
                }
                Rejection::UnknownMembership => (StatusCode::NOT_FOUND, "unknown_membership"),
                Rejection::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
                Rejection::BadRequest => (StatusCode::BAD_REQUEST, "bad_request"),
                Rejection::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            },
        }
    }

    /// Message sent to the client. Store failures stay in the logs.
    fn public_message(&self) -> String {
        match self {
            ApiError::Pass(err) if err.rejection() == Rejection::Unavailable => {
                "Service temporarily unavailable".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (
            status,
            Json(serde_json::json!({ "error": self.public_message(), "code": code })),
        )
            .into_response()
    }
}
