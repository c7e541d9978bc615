// ================
// crates/common/src/lib.rs
// ================
//! Wire types shared between the SaaS auth server and its clients.
//!
//! User-facing objects are camelCase on the wire. Token fields keep the
//! snake_case names (`access_token`, `refresh_token`) the web client reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User identifier
pub type UserId = Uuid;

/// Body of `POST /auth/register`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /auth/login`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Extends the refresh token lifetime
    #[serde(default)]
    pub remember_me: bool,
}

/// Body of `POST /auth/refresh`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// Body of `POST /auth/resend-verification`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ResendVerificationRequest {
    #[serde(default)]
    pub email: String,
}

/// Public view of a user returned by register and login
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email_verified: bool,
}

/// Full user record minus credentials, returned by `GET /auth/me`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub email_verified: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: UserSummary,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserSummary,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Outcome of verifying or re-sending a verification email.
///
/// These report failures in-band with `success: false` rather than as
/// HTTP errors, so the client can show the message directly.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl VerificationResponse {
    pub fn ok(message: impl Into<String>, user_id: Option<UserId>) -> Self {
        Self {
            success: true,
            message: message.into(),
            user_id,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            user_id: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of `GET /health`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub version: String,
}
