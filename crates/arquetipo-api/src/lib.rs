//! # arquetipo-api: Axum API service for Arquetipo
//!
//! ## API Surface
//!
//! | Prefix | Module | Auth |
//! |--------|--------|------|
//! | `/api/v1/cliente/*`, `/api/v2/cliente/*` | [`routes::clientes`] | none |
//! | `/api/Auth/*` | [`routes::auth`] | none |
//! | `/api/v1/UserJWT/*` | [`routes::user_jwt`] | bearer |
//! | `/api/v{1,2}/Util/*` | [`routes::util`] | bearer |
//! | `/health/*`, `/openapi.json` | here, [`openapi`] | none |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! RequestId → SecurityHeaders → CatchPanic → InternalError → Cors → Trace → [Bearer] → Handler
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod envelope;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{Method, StatusCode};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::auth::require_bearer;
use crate::middleware::exception::{catch_panic_layer, internal_error_middleware};
use crate::middleware::request_id::{request_id_middleware, X_REQUEST_ID};
use crate::middleware::security_headers::security_headers_middleware;
use crate::state::AppState;

pub use crate::config::{AppConfig, Environment};

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .expose_headers([X_REQUEST_ID])
}

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let environment = state.config.environment;

    // Unmatched paths fall through to 404 instead of 401.
    let protected = Router::new()
        .merge(routes::user_jwt::router())
        .merge(routes::util::router())
        .route_layer(from_fn_with_state(state.clone(), require_bearer));

    let api = Router::new()
        .merge(routes::clientes::router())
        .merge(routes::auth::router())
        .merge(protected)
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024));

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    with_middleware(Router::new().merge(health).merge(api), environment).with_state(state)
}

/// Wrap `router` in the service-wide middleware stack. The last layer added
/// runs first; security headers sit outside catch-panic so panic responses
/// carry them too.
fn with_middleware<S>(router: Router<S>, environment: Environment) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(middleware::tracing_layer::layer())
        .layer(cors_layer())
        .layer(from_fn_with_state(environment, internal_error_middleware))
        .layer(catch_panic_layer(environment))
        .layer(from_fn_with_state(environment, security_headers_middleware))
        .layer(from_fn(request_id_middleware))
}

async fn liveness() -> &'static str {
    "ok"
}

/// 200 "ready", or 503 when the configured database does not answer.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }
    (StatusCode::OK, "ready").into_response()
}
