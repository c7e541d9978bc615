//! HTTP handlers.
use axum::extract::FromRequest;

use crate::error::AppError;

pub mod auth;
pub mod health;

/// `axum::Json` with rejections rendered as `AppError`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
