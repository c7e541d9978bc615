// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Please verify your email before logging in")]
    EmailNotVerified,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Too many failed login attempts, please try again later")]
    AuthRateLimited,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(_)
            | AppError::InvalidCredentials
            | AppError::EmailNotVerified
            | AppError::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            AppError::AuthRateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "AUTH_001",
            AppError::InvalidCredentials => "AUTH_002",
            AppError::AuthRateLimited => "AUTH_003",
            AppError::EmailNotVerified => "AUTH_004",
            AppError::InvalidRefreshToken => "AUTH_005",
            AppError::Conflict(_) => "CONFLICT_001",
            AppError::InvalidInput(_) => "VAL_001",
            AppError::NotFound(_) => "NF_001",
            AppError::Database(_) => "DB_001",
            AppError::Migration(_) => "DB_002",
            AppError::Mail(_) => "MAIL_001",
            AppError::Internal(_) => "INT_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Whether the detailed message is meant for the client.
    ///
    /// Validation, conflict and auth messages are written for end users.
    /// Everything else may leak internals.
    pub fn is_client_facing(&self) -> bool {
        !self.status_code().is_server_error()
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Migration(_) => {
                "A database error occurred".to_string()
            },
            AppError::Mail(_) => "Failed to send email".to_string(),
            AppError::Json(_) => "Invalid request format".to_string(),
            AppError::Internal(_) | AppError::Io(_) => {
                "An internal server error occurred".to_string()
            },
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Use detailed messages in development, sanitized in production
        let message = if self.is_client_facing() || cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, error = %self, "request failed");
        }

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("background task failed: {err}"))
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}
