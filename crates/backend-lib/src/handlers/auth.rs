// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! `/auth/*` handlers.
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use saas_common::{
    LoginRequest, LoginResponse, MessageResponse, RefreshRequest, RefreshResponse,
    RegisterRequest, RegisterResponse, ResendVerificationRequest, UserProfile,
    VerificationResponse,
};

use super::ApiJson;
use crate::auth::{AuthUser, ClientIp};
use crate::error::AppError;
use crate::AppState;

pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let response = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// The outcome is reported in the body; expired or unknown tokens are still 200
pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<VerificationResponse>, AppError> {
    Ok(Json(state.auth.verify_email(&token).await?))
}

pub async fn resend_verification(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ResendVerificationRequest>,
) -> Result<Json<VerificationResponse>, AppError> {
    Ok(Json(state.auth.resend_verification(&req.email).await?))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(state.auth.login(req, ip).await?))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    Ok(Json(state.auth.refresh(&req.refresh_token).await?))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.auth.current_user(user.id).await?))
}

pub async fn logout(State(state): State<Arc<AppState>>, user: AuthUser) -> Json<MessageResponse> {
    Json(state.auth.logout(&user).await)
}
