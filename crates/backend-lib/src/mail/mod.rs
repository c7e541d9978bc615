// ============================
// crates/backend-lib/src/mail/mod.rs
// ============================
//! Outgoing email.
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::{MailTransport, SmtpSettings};
use crate::error::AppError;

pub mod smtp;
pub mod templates;

pub use smtp::SmtpMailer;

/// A rendered message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Delivery backend
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError>;
}

/// Build the mailer selected by the settings
pub fn from_settings(settings: &SmtpSettings) -> Result<Arc<dyn Mailer>, AppError> {
    Ok(match settings.transport {
        MailTransport::Smtp => Arc::new(SmtpMailer::new(settings)?),
        MailTransport::Log => Arc::new(LogMailer),
    })
}

/// Logs messages instead of sending them
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.text_body,
            "mail transport is `log`; message not delivered"
        );
        Ok(())
    }
}

/// Records messages in memory. Can be switched into a failing mode.
#[derive(Debug, Clone, Default)]
pub struct MemoryMailer {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    failing: Arc<Mutex<bool>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message delivered so far
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().clone()
    }

    pub fn last_to(&self, to: &str) -> Option<OutgoingEmail> {
        self.sent.lock().iter().rev().find(|m| m.to == to).cloned()
    }

    /// Make subsequent sends fail
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
        if *self.failing.lock() {
            return Err(AppError::Mail(format!("delivery to {} refused", email.to)));
        }
        self.sent.lock().push(email);
        Ok(())
    }
}
