//! Out-of-band delivery of confirmation codes.
//!
//! The API depends only on the [`Mailer`] trait. [`SmtpMailer`] delivers
//! through a relay; [`LogMailer`] writes the message to the log when SMTP is
//! not configured; [`MemoryMailer`] keeps messages for inspection in tests.

use std::sync::Mutex;

use async_trait::async_trait;

pub mod smtp;

pub use smtp::{EmailConfig, SmtpMailer};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for mail delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A plain-text message addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Build the message carrying a signup confirmation code.
pub fn confirmation_mail(to: &str, username: &str, code: &str) -> OutgoingMail {
    OutgoingMail {
        to: to.to_string(),
        subject: "Your Critica confirmation code".to_string(),
        body: format!(
            "Hello, {username}!\n\n\
             Your confirmation code is:\n\n{code}\n\n\
             Exchange it for an access token at POST /api/v1/auth/token/."
        ),
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// Delivers [`OutgoingMail`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            body = %mail.body,
            "SMTP not configured, mail logged instead of sent"
        );
        Ok(())
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages sent so far, oldest first.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// The most recent message sent to `to`.
    pub fn last_to(&self, to: &str) -> Option<OutgoingMail> {
        self.sent().into_iter().rev().find(|m| m.to == to)
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(mail);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_mail_carries_code() {
        let mail = confirmation_mail("bob@example.com", "bob", "1a2b-ff00");
        assert_eq!(mail.to, "bob@example.com");
        assert!(mail.body.contains("1a2b-ff00"));
        assert!(mail.body.contains("bob"));
    }

    #[tokio::test]
    async fn memory_mailer_records_in_order() {
        let mailer = MemoryMailer::new();
        mailer.send(confirmation_mail("a@x.io", "a", "1")).await.unwrap();
        mailer.send(confirmation_mail("b@x.io", "b", "2")).await.unwrap();
        mailer.send(confirmation_mail("a@x.io", "a", "3")).await.unwrap();

        assert_eq!(mailer.sent().len(), 3);
        let last = mailer.last_to("a@x.io").unwrap();
        assert!(last.body.contains('3'));
        assert!(mailer.last_to("c@x.io").is_none());
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mailer: Box<dyn Mailer> = Box::new(LogMailer);
        assert!(mailer.send(confirmation_mail("a@x.io", "a", "1")).await.is_ok());
    }

    #[test]
    fn mail_error_display_build() {
        let err = MailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }
}
