// ============================
// crates/backend-lib/src/mail/smtp.rs
// ============================
//! SMTP delivery through `lettre`.
use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{Mailer, OutgoingEmail};
use crate::config::SmtpSettings;
use crate::error::AppError;

/// Plain SMTP without TLS or auth, as MailHog expects in development
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, AppError> {
        let from: Mailbox = settings
            .from
            .parse()
            .map_err(|e| AppError::Mail(format!("invalid sender `{}`: {e}", settings.from)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(settings.host.as_str())
            .port(settings.port)
            .build();

        tracing::info!(host = %settings.host, port = settings.port, "SMTP transport initialized");
        Ok(Self { transport, from })
    }

    fn build_message(&self, email: OutgoingEmail) -> Result<Message, AppError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| AppError::Mail(format!("invalid recipient `{}`: {e}", email.to)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .multipart(MultiPart::alternative_plain_html(email.text_body, email.html_body))
            .map_err(|e| AppError::Mail(format!("failed to build message: {e}")))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
        let message = self.build_message(email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Mail(e.to_string()))?;
        Ok(())
    }
}
