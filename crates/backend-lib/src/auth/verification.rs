// ============================
// crates/backend-lib/src/auth/verification.rs
// ============================
//! Email verification token lifecycle.
use std::sync::Arc;

use chrono::{Duration, Utc};
use metrics::counter;
use saas_common::VerificationResponse;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::token_generator::generate_secure_token;
use crate::error::AppError;
use crate::mail::{templates, Mailer};
use crate::metrics as keys;
use crate::storage::{NewVerificationToken, Storage};

/// Issues, mails, checks and expires verification tokens
#[derive(Clone)]
pub struct EmailVerifier {
    storage: Arc<dyn Storage>,
    mailer: Arc<dyn Mailer>,
    frontend_url: String,
    ttl: Duration,
}

impl EmailVerifier {
    pub fn new(
        storage: Arc<dyn Storage>,
        mailer: Arc<dyn Mailer>,
        frontend_url: impl Into<String>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            storage,
            mailer,
            frontend_url: frontend_url.into(),
            ttl: super::jwt::secs(ttl_secs),
        }
    }

    /// Store a fresh token for the user and mail them the link
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn send_verification_email(&self, user_id: Uuid, email: &str) -> Result<(), AppError> {
        let token = generate_secure_token();
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal("verification token expiry out of range".to_string()))?;

        self.storage
            .create_verification_token(NewVerificationToken {
                token: token.clone(),
                email: email.to_string(),
                user_id,
                expires_at,
            })
            .await?;

        let url = templates::verification_url(&self.frontend_url, &token);
        let message = templates::verification_email(email, &url, self.ttl.num_hours().max(1) as u64);

        if let Err(e) = self.mailer.send(message).await {
            counter!(keys::MAIL_SEND_FAILED).increment(1);
            error!(error = %e, %email, "failed to send verification email");
            return Err(AppError::Mail("Failed to send verification email".to_string()));
        }

        counter!(keys::MAIL_VERIFICATION_SENT).increment(1);
        info!(%email, token_expiry = %expires_at, "verification email sent");
        Ok(())
    }

    /// Consume a token and mark its user verified
    #[instrument(skip_all)]
    pub async fn verify_email_token(&self, token: &str) -> VerificationResponse {
        match self.try_verify(token).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "email verification failed");
                VerificationResponse::failed("Email verification failed")
            },
        }
    }

    async fn try_verify(&self, token: &str) -> Result<VerificationResponse, AppError> {
        let Some(record) = self.storage.find_verification_token(token).await? else {
            return Ok(VerificationResponse::failed("Invalid verification token"));
        };

        let now = Utc::now();
        if record.is_expired_at(now) {
            self.storage.delete_verification_token(record.id).await?;
            warn!(user_id = %record.user_id, "expired verification token presented");
            return Ok(VerificationResponse::failed("Verification token has expired"));
        }

        self.storage
            .complete_email_verification(record.id, record.user_id, now)
            .await?;

        counter!(keys::AUTH_EMAIL_VERIFIED).increment(1);
        info!(user_id = %record.user_id, email = %record.email, "email verified successfully");
        Ok(VerificationResponse::ok(
            "Email verified successfully",
            Some(record.user_id),
        ))
    }

    /// Replace the user's pending tokens with a new one and mail it
    #[instrument(skip(self))]
    pub async fn resend_verification_email(&self, email: &str) -> VerificationResponse {
        match self.try_resend(email).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "failed to resend verification email");
                VerificationResponse::failed("Failed to resend verification email")
            },
        }
    }

    async fn try_resend(&self, email: &str) -> Result<VerificationResponse, AppError> {
        let Some(user) = self.storage.find_user_by_email(email).await? else {
            return Ok(VerificationResponse::failed("User not found"));
        };

        if user.email_verified {
            return Ok(VerificationResponse::failed("Email is already verified"));
        }

        let removed = self.storage.delete_verification_tokens_for_user(user.id).await?;
        info!(user_id = %user.id, removed, "replacing pending verification tokens");

        self.send_verification_email(user.id, &user.email).await?;
        Ok(VerificationResponse::ok("Verification email sent", None))
    }

    /// Delete expired tokens; failures are logged and count as zero
    pub async fn cleanup_expired_tokens(&self) -> u64 {
        match self.storage.delete_expired_verification_tokens(Utc::now()).await {
            Ok(count) => {
                counter!(keys::TOKENS_EXPIRED_CLEANED).increment(count);
                info!(count, "cleaned up expired email verification tokens");
                count
            },
            Err(e) => {
                error!(error = %e, "failed to clean up expired tokens");
                0
            },
        }
    }
}
