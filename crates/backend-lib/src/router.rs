// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP routing.
use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::handlers::{auth, health};
use crate::middleware::log_requests;
use crate::AppState;

/// CORS for the browser frontend: any origin is mirrored back, with credentials
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/verify-email/{token}", get(auth::verify_email))
        .route("/resend-verification", post(auth::resend_verification))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout));

    Router::new()
        .route("/", get(health::hello))
        .route("/health", get(health::health))
        .nest("/auth", auth_routes)
        .layer(axum::middleware::from_fn(log_requests))
        .layer(cors_layer())
        .with_state(state)
}
