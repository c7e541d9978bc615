// ============================
// crates/backend-lib/src/storage/mod.rs
// ============================
//! Storage abstraction with Postgres and in-memory implementations.
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use saas_common::{UserProfile, UserSummary};
use uuid::Uuid;

use crate::error::AppError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

/// Message used for duplicate-email conflicts
pub const DUPLICATE_EMAIL: &str = "User with this email already exists";

/// A stored user
#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    /// bcrypt hash; absent for accounts without a password
    pub password: Option<String>,
    pub email_verified: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("email_verified", &self.email_verified)
            .field("email_verified_at", &self.email_verified_at)
            .finish_non_exhaustive()
    }
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            email_verified: self.email_verified,
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            email_verified: self.email_verified,
            email_verified_at: self.email_verified_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Fields needed to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Already normalized
    pub email: String,
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

/// A pending email verification
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VerificationToken {
    pub id: Uuid,
    pub token: String,
    pub email: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl VerificationToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct NewVerificationToken {
    pub token: String,
    pub email: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Trait for storage backends
#[async_trait]
pub trait Storage: Send + Sync {
    /// Look a user up by normalized email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Create an unverified user. A taken email yields `AppError::Conflict`.
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError>;

    /// Delete a user and their verification tokens
    async fn delete_user(&self, id: Uuid) -> Result<(), AppError>;

    async fn create_verification_token(
        &self,
        token: NewVerificationToken,
    ) -> Result<VerificationToken, AppError>;

    async fn find_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<VerificationToken>, AppError>;

    async fn delete_verification_token(&self, id: Uuid) -> Result<(), AppError>;

    /// Delete every token of a user, returning how many were removed
    async fn delete_verification_tokens_for_user(&self, user_id: Uuid) -> Result<u64, AppError>;

    /// Mark the user verified at `at` and consume the token, atomically
    async fn complete_email_verification(
        &self,
        token_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Delete tokens that expired before `now`
    async fn delete_expired_verification_tokens(&self, now: DateTime<Utc>) -> Result<u64, AppError>;

    /// Check the backend is reachable
    async fn ping(&self) -> Result<(), AppError>;

    /// Release connections on shutdown
    async fn close(&self) {}

    /// Short backend name for health output
    fn backend_name(&self) -> &'static str;
}
