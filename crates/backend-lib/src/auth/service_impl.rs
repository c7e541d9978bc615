use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use saas_common::{
    LoginRequest, LoginResponse, MessageResponse, RefreshResponse, RegisterRequest,
    RegisterResponse, UserProfile, VerificationResponse,
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use zeroize::Zeroize;

use super::jwt::{JwtKeys, TokenKind};
use super::password::{hash_password_secure, verify_password, PasswordRequirements};
use super::{AuthRateLimiter, AuthService, AuthUser, EmailVerifier};
use crate::error::AppError;
use crate::metrics as keys;
use crate::storage::{NewUser, Storage, DUPLICATE_EMAIL};
use crate::validation::{normalize_email, require, validate_email, validate_registration};

const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

pub struct DefaultAuth {
    storage: Arc<dyn Storage>,
    verifier: EmailVerifier,
    jwt: JwtKeys,
    limiter: AuthRateLimiter,
    bcrypt_cost: u32,
    password_requirements: PasswordRequirements,
}

impl DefaultAuth {
    pub fn new(
        storage: Arc<dyn Storage>,
        verifier: EmailVerifier,
        jwt: JwtKeys,
        limiter: AuthRateLimiter,
        bcrypt_cost: u32,
        password_requirements: PasswordRequirements,
    ) -> Self {
        Self {
            storage,
            verifier,
            jwt,
            limiter,
            bcrypt_cost,
            password_requirements,
        }
    }

    async fn try_register(&self, mut req: RegisterRequest) -> Result<RegisterResponse, AppError> {
        let valid = validate_registration(&req, &self.password_requirements);
        req.password.zeroize();
        let mut valid = valid.map_err(|errors| AppError::InvalidInput(errors.join(", ")))?;

        if self.storage.find_user_by_email(&valid.email).await?.is_some() {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }

        let password_hash = hash_password_secure(&mut valid.password, self.bcrypt_cost).await?;

        let user = self
            .storage
            .create_user(NewUser {
                email: valid.email,
                name: valid.name,
                password_hash: Some(password_hash),
            })
            .await?;

        if let Err(e) = self.verifier.send_verification_email(user.id, &user.email).await {
            // Without the mail the account could never be verified
            warn!(error = %e, user_id = %user.id, "rolling back registration");
            if let Err(e) = self.storage.delete_user(user.id).await {
                error!(error = %e, user_id = %user.id, "failed to roll back registration");
            }
            return Err(AppError::InvalidInput(REGISTRATION_FAILED.to_string()));
        }

        counter!(keys::AUTH_REGISTER).increment(1);
        info!(user_id = %user.id, email = %user.email, has_name = user.name.is_some(), "new user registered");

        Ok(RegisterResponse {
            success: true,
            message: "Registration successful. Please check your email to verify your account."
                .to_string(),
            user: user.summary(),
        })
    }

    async fn try_refresh(&self, token: &str) -> Result<RefreshResponse, AppError> {
        let claims = self.jwt.decode(token, TokenKind::Refresh).map_err(|e| {
            debug!(error = %e, "refresh token rejected");
            AppError::InvalidRefreshToken
        })?;

        let user = self
            .storage
            .find_user_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidRefreshToken)?;

        let access_token = self.jwt.issue_access(user.id, &user.email)?;
        counter!(keys::AUTH_REFRESH).increment(1);
        debug!(user_id = %user.id, "access token refreshed");

        Ok(RefreshResponse { access_token })
    }

    /// Count a failed login and build the error returned to the client
    fn reject_login(&self, ip: IpAddr, email: &str) -> AppError {
        counter!(keys::AUTH_LOGIN_FAILURE).increment(1);
        if self.limiter.record_failed_attempt(ip) {
            counter!(keys::AUTH_LOGIN_LOCKED).increment(1);
        }
        warn!(%ip, %email, "login rejected");
        AppError::InvalidCredentials
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    #[instrument(skip_all, fields(email = %req.email, has_name = req.name.is_some()))]
    async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse, AppError> {
        self.try_register(req).await.map_err(|e| match e {
            AppError::Conflict(_) | AppError::InvalidInput(_) => e,
            other => {
                error!(error = %other, "registration failed");
                AppError::InvalidInput(REGISTRATION_FAILED.to_string())
            },
        })
    }

    async fn verify_email(&self, token: &str) -> Result<VerificationResponse, AppError> {
        let token = require(token, "Verification token")
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        info!(token_length = token.len(), "email verification attempt");
        Ok(self.verifier.verify_email_token(token).await)
    }

    async fn resend_verification(&self, email: &str) -> Result<VerificationResponse, AppError> {
        let email = require(email, "Email").map_err(|e| AppError::InvalidInput(e.to_string()))?;
        Ok(self.verifier.resend_verification_email(&normalize_email(email)).await)
    }

    #[instrument(skip_all, fields(%client_ip, remember_me = req.remember_me))]
    async fn login(&self, req: LoginRequest, client_ip: IpAddr) -> Result<LoginResponse, AppError> {
        if !self.limiter.check_rate_limit(client_ip) {
            counter!(keys::AUTH_LOGIN_LOCKED).increment(1);
            return Err(AppError::AuthRateLimited);
        }

        let email = normalize_email(&req.email);
        validate_email(&email).map_err(|e| AppError::InvalidInput(e.to_string()))?;
        if req.password.is_empty() {
            return Err(AppError::InvalidInput("Password is required".to_string()));
        }

        let Some(user) = self.storage.find_user_by_email(&email).await? else {
            return Err(self.reject_login(client_ip, &email));
        };

        let password_ok = match user.password.as_deref() {
            Some(hash) => verify_password(hash, &req.password).await,
            None => false,
        };
        if !password_ok {
            return Err(self.reject_login(client_ip, &email));
        }

        // The credentials were right, so this is not a guessing attempt
        self.limiter.record_success(client_ip);

        if !user.email_verified {
            info!(user_id = %user.id, "login refused until email is verified");
            return Err(AppError::EmailNotVerified);
        }

        let access_token = self.jwt.issue_access(user.id, &user.email)?;
        let refresh_token = self.jwt.issue_refresh(user.id, &user.email, req.remember_me)?;

        counter!(keys::AUTH_LOGIN_SUCCESS).increment(1);
        info!(user_id = %user.id, email = %user.email, "user logged in");

        Ok(LoginResponse {
            access_token,
            refresh_token,
            user: user.summary(),
        })
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AppError> {
        let token = require(refresh_token, "Refresh token")
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;

        self.try_refresh(token).await.map_err(|e| {
            if !matches!(e, AppError::InvalidRefreshToken) {
                error!(error = %e, "refresh failed");
            }
            AppError::InvalidRefreshToken
        })
    }

    async fn current_user(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        self.storage
            .find_user_by_id(user_id)
            .await?
            .map(|user| user.profile())
            .ok_or_else(|| AppError::InvalidInput("User not found".to_string()))
    }

    fn authenticate(&self, access_token: &str) -> Result<AuthUser, AppError> {
        let claims = self
            .jwt
            .decode(access_token, TokenKind::Access)
            .map_err(|e| AppError::Auth(e.to_string()))?;
        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
        })
    }

    async fn logout(&self, user: &AuthUser) -> MessageResponse {
        info!(user_id = %user.id, email = %user.email, "user logged out");
        MessageResponse {
            message: "Logout successful".to_string(),
        }
    }
}
