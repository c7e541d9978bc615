// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod extractor;
pub mod jwt;
pub mod password;
pub mod rate_limit;
pub mod token_generator;
pub mod verification;
mod service;
mod service_impl;

pub use extractor::{AuthUser, ClientIp};
pub use jwt::{Claims, JwtKeys, TokenError, TokenKind};
pub use password::{hash_password, verify_password, validate_password_strength, PasswordRequirements, MIN_PASSWORD_LENGTH};
pub use rate_limit::AuthRateLimiter;
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use verification::EmailVerifier;
