use crate::common::MembershipId;
use crate::domains::auth::JwtService;
use crate::domains::membership::Role;
use crate::server::error::ApiError;
use axum::{middleware::Next, response::Response};
use std::sync::Arc;
use tracing::debug;

/// Authenticated caller information from JWT
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub membership_id: MembershipId,
    pub role: Role,
}

impl AuthUser {
    /// Only agents may redeem pass tokens.
    pub fn require_agent(&self) -> Result<MembershipId, ApiError> {
        match self.role {
            Role::Agent => Ok(self.membership_id),
            Role::Member => Err(ApiError::Forbidden("Agent access required")),
        }
    }
}

/// Require an authenticated caller, as attached by [`jwt_auth_middleware`].
pub fn require_auth(auth_user: Option<AuthUser>) -> Result<AuthUser, ApiError> {
    auth_user.ok_or(ApiError::Unauthenticated)
}

/// JWT authentication middleware
///
/// Extracts JWT token from Authorization header, verifies it, and adds AuthUser to request extensions.
/// If no token or invalid token, request continues without AuthUser; handlers decide.
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_user = extract_auth_user(&request, &jwt_service);

    if let Some(user) = auth_user {
        debug!(
            "Authenticated caller: {} (role: {:?})",
            user.membership_id, user.role
        );
        request.extensions_mut().insert(user);
    } else {
        debug!("No valid authentication token");
    }

    next.run(request).await
}

/// Extract and verify JWT token from request
fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    let auth_header = request.headers().get("authorization")?;
    let auth_str = auth_header.to_str().ok()?;

    // Extract token (handle both "Bearer <token>" and raw token)
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);

    let claims = jwt_service.verify_token(token).ok()?;

    Some(AuthUser {
        membership_id: claims.membership_id,
        role: claims.role,
    })
}
