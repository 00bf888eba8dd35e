//! Outbound notification mail.
//!
//! The platform notifies the operations inbox when a book is donated. Mail
//! goes out through a transactional-mail HTTP API; when no `[mail]` section
//! is configured the sender degrades to a tracing-only no-op so the insert
//! flow behaves the same in every environment.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Serialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), ServiceError>;
}

/// Posts JSON to a transactional-mail endpoint, authenticated with a bearer
/// API key.
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(cfg: &configs::MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
            from: cfg.from.clone(),
        }
    }
}

#[derive(Serialize)]
struct OutboundMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: Email) -> Result<(), ServiceError> {
        let message = OutboundMessage {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            text: &email.body,
        };
        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&message)
            .send()
            .await
            .map_err(|e| ServiceError::Mail(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ServiceError::Mail(format!("mail API returned {}", resp.status())));
        }
        debug!(to = %email.to, subject = %email.subject, "mail delivered");
        Ok(())
    }
}

/// Fallback sender used when mail is not configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), ServiceError> {
        info!(to = %email.to, subject = %email.subject, "mail disabled; dropping message");
        Ok(())
    }
}

/// Recording mailer for tests
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockMailer {
        sent: Mutex<Vec<Email>>,
    }

    impl MockMailer {
        pub fn sent(&self) -> Vec<Email> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for MockMailer {
        async fn send(&self, email: Email) -> Result<(), ServiceError> {
            self.sent.lock().unwrap().push(email);
            Ok(())
        }
    }

    /// Mailer that always fails, for exercising the non-fatal notify path.
    #[derive(Default)]
    pub struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _email: Email) -> Result<(), ServiceError> {
            Err(ServiceError::Mail("mail endpoint unreachable".into()))
        }
    }
}
