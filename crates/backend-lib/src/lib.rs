// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the SaaS account server.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod mail;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod storage;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::auth::{AuthRateLimiter, AuthService, DefaultAuth, EmailVerifier, JwtKeys};
use crate::config::{Settings, StorageBackend};
use crate::error::AppError;
use crate::mail::Mailer;
use crate::storage::{MemoryStorage, PgStorage, Storage};

pub use router::create_router;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Account operations
    pub auth: Arc<dyn AuthService>,
    /// Storage backend
    pub storage: Arc<dyn Storage>,
    pub verifier: EmailVerifier,
    /// Login rate limiter, shared with `auth`
    pub rate_limiter: AuthRateLimiter,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire the services together over the given storage and mailer
    pub fn new(settings: Settings, storage: Arc<dyn Storage>, mailer: Arc<dyn Mailer>) -> Self {
        let verifier = EmailVerifier::new(
            storage.clone(),
            mailer,
            settings.frontend_url.clone(),
            settings.email_verification_ttl_secs,
        );
        let rate_limiter = AuthRateLimiter::from_settings(&settings.auth_rate_limit);
        let auth = Arc::new(DefaultAuth::new(
            storage.clone(),
            verifier.clone(),
            JwtKeys::new(&settings.jwt),
            rate_limiter.clone(),
            settings.bcrypt_cost,
            settings.password_requirements.clone(),
        ));

        Self {
            auth,
            storage,
            verifier,
            rate_limiter,
            settings: Arc::new(settings),
        }
    }

    /// Build the state from settings alone, connecting storage and mail
    pub async fn from_settings(settings: Settings) -> Result<Self, AppError> {
        let storage = connect_storage(&settings, true).await?;
        let mailer = mail::from_settings(&settings.smtp)?;
        Ok(Self::new(settings, storage, mailer))
    }
}

/// Open the configured storage backend, optionally applying migrations
pub async fn connect_storage(
    settings: &Settings,
    run_migrations: bool,
) -> Result<Arc<dyn Storage>, AppError> {
    match settings.storage {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryStorage::new()))
        },
        StorageBackend::Postgres => {
            let pg = PgStorage::connect(&settings.database_url, settings.database_max_connections)
                .await?;
            if run_migrations {
                pg.migrate().await?;
                tracing::info!("database migrations applied");
            }
            Ok(Arc::new(pg))
        },
    }
}

/// Periodically purge expired verification tokens and stale lockouts
pub fn spawn_maintenance(state: Arc<AppState>) -> JoinHandle<()> {
    let period = Duration::from_secs(state.settings.maintenance_interval_secs);
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            tracing::debug!("running scheduled maintenance");
            state.verifier.cleanup_expired_tokens().await;
            state.rate_limiter.cleanup();
        }
    })
}
