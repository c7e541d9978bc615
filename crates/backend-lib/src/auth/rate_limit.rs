// ============================
// crates/backend-lib/src/auth/rate_limit.rs
// ============================
//! Rate limiting for login attempts.

use dashmap::DashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::AuthRateLimitSettings;

/// Default number of failed attempts before rate limiting
const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default lockout duration (5 minutes)
const DEFAULT_LOCKOUT_DURATION: Duration = Duration::from_secs(5 * 60);

/// Idle entries older than this are dropped by `cleanup`
const ENTRY_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// Entry in the rate limit map
#[derive(Debug, Clone)]
struct RateLimitEntry {
    /// Number of failed attempts
    failed_attempts: u32,
    /// Time of the last failed attempt
    last_failure: Instant,
    /// When the lockout expires, if locked out
    lockout_expiry: Option<Instant>,
}

/// Rate limiter for login attempts, keyed by client IP
#[derive(Debug, Clone)]
pub struct AuthRateLimiter {
    /// Map of IP addresses to rate limit entries
    attempts: Arc<DashMap<IpAddr, RateLimitEntry>>,
    /// Maximum number of failed attempts before lockout
    max_attempts: u32,
    /// Duration of lockout period
    lockout_duration: Duration,
}

impl Default for AuthRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_LOCKOUT_DURATION)
    }
}

impl AuthRateLimiter {
    /// Create a new auth rate limiter
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_attempts,
            lockout_duration,
        }
    }

    pub fn from_settings(settings: &AuthRateLimitSettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_secs(settings.lockout_secs),
        )
    }

    /// Record a failed attempt; returns true when this failure triggers a lockout
    pub fn record_failed_attempt(&self, ip: IpAddr) -> bool {
        let now = Instant::now();

        let mut entry = self.attempts.entry(ip).or_insert_with(|| RateLimitEntry {
            failed_attempts: 0,
            last_failure: now,
            lockout_expiry: None,
        });

        // Start over once a lockout has run out
        if entry.lockout_expiry.is_some_and(|expiry| now >= expiry) {
            entry.failed_attempts = 0;
            entry.lockout_expiry = None;
        }

        entry.failed_attempts += 1;
        entry.last_failure = now;

        if entry.failed_attempts >= self.max_attempts && entry.lockout_expiry.is_none() {
            entry.lockout_expiry = Some(now + self.lockout_duration);
            tracing::warn!(
                %ip,
                attempts = entry.failed_attempts,
                lockout_secs = self.lockout_duration.as_secs(),
                "client locked out after repeated login failures"
            );
            return true;
        }

        false
    }

    /// Record a successful login
    pub fn record_success(&self, ip: IpAddr) {
        self.attempts.remove(&ip);
    }

    /// Check if an IP is allowed to attempt a login
    pub fn check_rate_limit(&self, ip: IpAddr) -> bool {
        match self.attempts.get(&ip) {
            Some(entry) => match entry.lockout_expiry {
                Some(expiry) => Instant::now() >= expiry,
                None => true,
            },
            None => true,
        }
    }

    /// Number of tracked clients
    pub fn tracked(&self) -> usize {
        self.attempts.len()
    }

    /// Clean up expired lockouts and stale entries
    pub fn cleanup(&self) {
        let now = Instant::now();

        self.attempts.retain(|_, entry| match entry.lockout_expiry {
            Some(expiry) => now < expiry,
            None => now.duration_since(entry.last_failure) < ENTRY_RETENTION,
        });
    }
}
