//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::domains::auth::JwtService;
use crate::domains::pass::{PassPolicy, RedemptionEngine, TokenIssuer};
use crate::kernel::BaseAccountStore;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{agent_scan_handler, health_handler, member_pass_handler};

/// Upper bound on one request; each handler does a handful of store round-trips.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BaseAccountStore>,
    pub issuer: TokenIssuer,
    pub redemption: RedemptionEngine,
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn BaseAccountStore>,
        policy: PassPolicy,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            issuer: TokenIssuer::new(store.clone(), policy),
            redemption: RedemptionEngine::new(store.clone(), policy),
            store,
            jwt_service,
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Allow any origin when none are configured (development)
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// Build the Axum application router
pub fn build_app(state: AppState, allowed_origins: &[String]) -> Router {
    let jwt_service_for_middleware = state.jwt_service.clone();

    Router::new()
        .route("/api/member/me", get(member_pass_handler))
        .route("/api/agent/scan", post(agent_scan_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service_for_middleware.clone(), req, next)
        })) // JWT authentication
        .layer(Extension(state))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
