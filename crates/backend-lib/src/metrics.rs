// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const AUTH_REGISTER: &str = "auth.register";
pub const AUTH_LOGIN_SUCCESS: &str = "auth.login.success";
pub const AUTH_LOGIN_FAILURE: &str = "auth.login.failure";
pub const AUTH_LOGIN_LOCKED: &str = "auth.login.locked";
pub const AUTH_REFRESH: &str = "auth.refresh";
pub const AUTH_EMAIL_VERIFIED: &str = "auth.email_verified";
pub const MAIL_VERIFICATION_SENT: &str = "mail.verification_sent";
pub const MAIL_SEND_FAILED: &str = "mail.send_failed";
pub const TOKENS_EXPIRED_CLEANED: &str = "tokens.expired_cleaned";
