// crates/backend-lib/src/middleware/mod.rs

//! HTTP middleware.

pub mod request_log;

pub use request_log::{log_requests, REQUEST_ID_HEADER};
