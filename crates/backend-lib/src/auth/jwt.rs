// ============================
// crates/backend-lib/src/auth/jwt.rs
// ============================
//! JWT issuance and validation.
//!
//! Access and refresh tokens share the signing key and carry a `typ`
//! claim, so one kind is never accepted in place of the other.
use chrono::{Duration, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtSettings;
use crate::error::AppError;

/// Token kind carried in the `typ` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub email: String,
    pub typ: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("expected a {expected:?} token")]
    WrongKind { expected: TokenKind },

    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Signing material and lifetimes
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
    remember_me_refresh_ttl: Duration,
}

impl JwtKeys {
    pub fn new(settings: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
            access_ttl: secs(settings.access_ttl_secs),
            refresh_ttl: secs(settings.refresh_ttl_secs),
            remember_me_refresh_ttl: secs(settings.remember_me_refresh_ttl_secs),
        }
    }

    /// Sign a token of `kind` that lives for `ttl`
    pub fn issue(
        &self,
        user_id: Uuid,
        email: &str,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Internal("token lifetime out of range".to_string()))?;
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            typ: kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))
    }

    pub fn issue_access(&self, user_id: Uuid, email: &str) -> Result<String, AppError> {
        self.issue(user_id, email, TokenKind::Access, self.access_ttl)
    }

    pub fn issue_refresh(
        &self,
        user_id: Uuid,
        email: &str,
        remember_me: bool,
    ) -> Result<String, AppError> {
        let ttl = if remember_me {
            self.remember_me_refresh_ttl
        } else {
            self.refresh_ttl
        };
        self.issue(user_id, email, TokenKind::Refresh, ttl)
    }

    /// Check signature, expiry and kind
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?;

        if data.claims.typ != expected {
            return Err(TokenError::WrongKind { expected });
        }

        Ok(data.claims)
    }
}

/// Seconds as a `Duration`, saturating at `Duration::MAX`
pub(crate) fn secs(value: u64) -> Duration {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}
