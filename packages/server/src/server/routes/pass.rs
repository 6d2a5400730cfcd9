//! Pass token endpoints: member poll and agent scan.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::domains::pass::{IssuedPass, Redemption};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::{require_auth, AuthUser};

/// `GET /api/member/me`
///
/// Called on every dashboard load; returns the caller's current pass token,
/// rotating it only when the previous one is stale or used.
pub async fn member_pass_handler(
    Extension(state): Extension<AppState>,
    auth_user: Option<Extension<AuthUser>>,
) -> Result<Json<IssuedPass>, ApiError> {
    let user = require_auth(auth_user.map(|Extension(u)| u))?;

    let pass = state
        .issuer
        .ensure_current_token(user.membership_id, Utc::now())
        .await?;

    Ok(Json(pass))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub pass_token: String,
}

/// `POST /api/agent/scan`
///
/// Agents only. Redeems the scanned token once. The caller is checked
/// before the body is looked at.
pub async fn agent_scan_handler(
    Extension(state): Extension<AppState>,
    auth_user: Option<Extension<AuthUser>>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<Redemption>, ApiError> {
    let user = require_auth(auth_user.map(|Extension(u)| u))?;
    let agent_id = user.require_agent()?;
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    tracing::debug!(agent_id = %agent_id, "Scan received");

    let redemption = state
        .redemption
        .redeem(&request.pass_token, Utc::now())
        .await?;

    Ok(Json(redemption))
}
