use std::net::IpAddr;

use async_trait::async_trait;
use saas_common::{
    LoginRequest, LoginResponse, MessageResponse, RefreshResponse, RegisterRequest,
    RegisterResponse, UserProfile, VerificationResponse,
};
use uuid::Uuid;

use super::AuthUser;
use crate::error::AppError;

/// The account operations behind `/auth/*`
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an unverified account and mail a verification link
    async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse, AppError>;

    async fn verify_email(&self, token: &str) -> Result<VerificationResponse, AppError>;

    async fn resend_verification(&self, email: &str) -> Result<VerificationResponse, AppError>;

    /// Check credentials and issue an access/refresh token pair
    async fn login(&self, req: LoginRequest, client_ip: IpAddr) -> Result<LoginResponse, AppError>;

    /// Exchange a refresh token for a new access token
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AppError>;

    async fn current_user(&self, user_id: Uuid) -> Result<UserProfile, AppError>;

    /// Resolve a bearer access token
    fn authenticate(&self, access_token: &str) -> Result<AuthUser, AppError>;

    /// Sessions are stateless; the client discards its tokens
    async fn logout(&self, user: &AuthUser) -> MessageResponse;
}
