// ============================
// crates/backend-lib/src/storage/postgres.rs
// ============================
//! PostgreSQL storage.
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use super::{NewUser, NewVerificationToken, Storage, User, VerificationToken, DUPLICATE_EMAIL};
use crate::error::AppError;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const USER_COLUMNS: &str =
    "id, email, name, password, email_verified, email_verified_at, created_at, updated_at";

const TOKEN_COLUMNS: &str = "id, token, email, user_id, expires_at, created_at";

/// `Storage` backed by a Postgres connection pool
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Connect a pool to `database_url`
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        tracing::info!(max_connections, "connected to database");
        Ok(Self { pool })
    }

    /// Apply pending migrations
    pub async fn migrate(&self) -> Result<(), AppError> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl Storage for PgStorage {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, email, name, password, email_verified)
             VALUES ($1, $2, $3, $4, FALSE)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(DUPLICATE_EMAIL.to_string())
            } else {
                AppError::Database(e)
            }
        })
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_verification_token(
        &self,
        token: NewVerificationToken,
    ) -> Result<VerificationToken, AppError> {
        let record = sqlx::query_as::<_, VerificationToken>(&format!(
            "INSERT INTO email_verification_tokens (id, token, email, user_id, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TOKEN_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&token.token)
        .bind(&token.email)
        .bind(token.user_id)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    async fn find_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<VerificationToken>, AppError> {
        let record = sqlx::query_as::<_, VerificationToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM email_verification_tokens WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn delete_verification_token(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM email_verification_tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_verification_tokens_for_user(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM email_verification_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn complete_email_verification(
        &self,
        token_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // The token row is the claim; a second caller finds nothing to delete
        let deleted = sqlx::query("DELETE FROM email_verification_tokens WHERE id = $1")
            .bind(token_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() != 1 {
            return Err(AppError::NotFound(format!("verification token {token_id}")));
        }

        let updated = sqlx::query(
            "UPDATE users
             SET email_verified = TRUE, email_verified_at = $2, updated_at = $2
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(at)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user {user_id}")));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_expired_verification_tokens(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM email_verification_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("disconnected from database");
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
