use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::{info, warn};
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Delivers a single plain-text email to one recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &MailConfig) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        Ok(SmtpNotifier {
            transport,
            from: config.from.parse()?,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_owned())?;
        self.transport.send(message).await?;
        info!("Email sent to {}", to);
        Ok(())
    }
}

/// Installed when no SMTP account is configured.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), NotifyError> {
        warn!("Mail is not configured, skipping \"{}\" for {}", subject, to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_config(from: &str) -> MailConfig {
        MailConfig {
            smtp_host: "smtp.example.com".to_owned(),
            smtp_port: 465,
            username: "garage".to_owned(),
            password: "secret".to_owned(),
            from: from.to_owned(),
        }
    }

    #[test]
    fn smtp_notifier_rejects_bad_sender() {
        let result = SmtpNotifier::new(&mail_config("not an address"));
        assert!(matches!(result, Err(NotifyError::Address(_))));
    }

    #[actix_web::test]
    async fn smtp_notifier_rejects_bad_recipient_before_connecting() {
        let notifier = SmtpNotifier::new(&mail_config("garage@example.com")).unwrap();
        let result = notifier.send("nobody", "subject", "body").await;
        assert!(matches!(result, Err(NotifyError::Address(_))));
    }

    #[actix_web::test]
    async fn disabled_notifier_succeeds() {
        assert!(DisabledNotifier.send("a@example.com", "s", "b").await.is_ok());
    }
}
