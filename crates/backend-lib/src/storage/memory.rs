// ============================
// crates/backend-lib/src/storage/memory.rs
// ============================
//! In-memory storage for tests and database-less development.
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use super::{NewUser, NewVerificationToken, Storage, User, VerificationToken, DUPLICATE_EMAIL};
use crate::error::AppError;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    tokens: HashMap<Uuid, VerificationToken>,
}

/// `Storage` backed by process memory. Cloning shares the data.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    tables: Arc<RwLock<Tables>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub fn user_count(&self) -> usize {
        self.tables.read().users.len()
    }

    /// Every stored verification token
    pub fn verification_tokens(&self) -> Vec<VerificationToken> {
        self.tables.read().tokens.values().cloned().collect()
    }

    /// Make every operation fail as if the database were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.check_available()?;
        let tables = self.tables.read();
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        self.check_available()?;
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        if tables.users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            name: new_user.name,
            password: new_user.password_hash,
            email_verified: false,
            email_verified_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        tables.users.remove(&id);
        tables.tokens.retain(|_, t| t.user_id != id);
        Ok(())
    }

    async fn create_verification_token(
        &self,
        token: NewVerificationToken,
    ) -> Result<VerificationToken, AppError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&token.user_id) {
            return Err(AppError::NotFound(format!("user {}", token.user_id)));
        }
        if tables.tokens.values().any(|t| t.token == token.token) {
            return Err(AppError::Conflict("verification token already exists".to_string()));
        }

        let record = VerificationToken {
            id: Uuid::new_v4(),
            token: token.token,
            email: token.email,
            user_id: token.user_id,
            expires_at: token.expires_at,
            created_at: Utc::now(),
        };
        tables.tokens.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<VerificationToken>, AppError> {
        self.check_available()?;
        let tables = self.tables.read();
        Ok(tables.tokens.values().find(|t| t.token == token).cloned())
    }

    async fn delete_verification_token(&self, id: Uuid) -> Result<(), AppError> {
        self.check_available()?;
        self.tables.write().tokens.remove(&id);
        Ok(())
    }

    async fn delete_verification_tokens_for_user(&self, user_id: Uuid) -> Result<u64, AppError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        let before = tables.tokens.len();
        tables.tokens.retain(|_, t| t.user_id != user_id);
        Ok((before - tables.tokens.len()) as u64)
    }

    async fn complete_email_verification(
        &self,
        token_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("user {user_id}")));
        }
        tables
            .tokens
            .remove(&token_id)
            .ok_or_else(|| AppError::NotFound(format!("verification token {token_id}")))?;

        if let Some(user) = tables.users.get_mut(&user_id) {
            user.email_verified = true;
            user.email_verified_at = Some(at);
            user.updated_at = at;
        }
        Ok(())
    }

    async fn delete_expired_verification_tokens(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        let before = tables.tokens.len();
        tables.tokens.retain(|_, t| t.expires_at >= now);
        Ok((before - tables.tokens.len()) as u64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check_available()?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
