//! Email delivery over SMTP with implicit TLS.

use crate::config::EmailSettings;
use crate::types::MonitorResult;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// A composed plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub subject: String,
    pub body: String,
    pub to: Vec<String>,
}

impl OutgoingEmail {
    /// Subject is the title; the body ends with a link to the enrollment portal.
    pub fn compose(title: &str, message: &str, portal_url: &str, to: Vec<String>) -> Self {
        Self {
            subject: title.to_string(),
            body: format!("{message}\n\nGo enroll now!\n{portal_url}"),
            to,
        }
    }

    pub fn recipients(&self) -> String {
        self.to.join(", ")
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// One SMTP session, no retry.
    async fn send(&self, email: &OutgoingEmail) -> MonitorResult<()>;
}

/// Authenticated SMTP sender.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &EmailSettings) -> MonitorResult<Self> {
        let from: Mailbox = settings.address.parse()?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)?
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                settings.address.clone(),
                settings.app_password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();
        Ok(Self { transport, from })
    }

    fn build(&self, email: &OutgoingEmail) -> MonitorResult<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN);
        for to in &email.to {
            builder = builder.to(to.parse::<Mailbox>()?);
        }
        Ok(builder.body(email.body.clone())?)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> MonitorResult<()> {
        let message = self.build(email)?;
        self.transport.send(message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> EmailSettings {
        EmailSettings {
            smtp_host: "smtp.example.com".into(),
            smtp_port: 465,
            address: "me@example.com".into(),
            app_password: "app-pass".into(),
            friends: vec![],
            friend_delay: Duration::from_secs(120),
            portal_url: "https://example.com/portal".into(),
        }
    }

    #[test]
    fn test_compose_body() {
        let email = OutgoingEmail::compose(
            "SPOT OPEN: COSC 031",
            "1 spot(s) open! Enrolled: 9/10",
            "https://example.com/portal",
            vec!["a@example.com".into(), "b@example.com".into()],
        );
        assert_eq!(email.subject, "SPOT OPEN: COSC 031");
        assert_eq!(
            email.body,
            "1 spot(s) open! Enrolled: 9/10\n\nGo enroll now!\nhttps://example.com/portal"
        );
        assert_eq!(email.recipients(), "a@example.com, b@example.com");
    }

    #[tokio::test]
    async fn test_build_message_headers() {
        let mailer = SmtpMailer::new(&settings()).unwrap();
        let email = OutgoingEmail::compose(
            "SPOT OPEN",
            "msg",
            "https://example.com/portal",
            vec!["a@example.com".into(), "b@example.com".into()],
        );
        let raw = String::from_utf8(mailer.build(&email).unwrap().formatted()).unwrap();
        assert!(raw.contains("From: me@example.com"));
        assert!(raw.contains("a@example.com"));
        assert!(raw.contains("b@example.com"));
        assert!(raw.contains("Subject: SPOT OPEN"));
    }

    #[tokio::test]
    async fn test_bad_recipient_is_notification_error() {
        let mailer = SmtpMailer::new(&settings()).unwrap();
        let email = OutgoingEmail::compose("t", "m", "u", vec!["not an address".into()]);
        assert!(matches!(
            mailer.build(&email),
            Err(crate::types::MonitorError::Notification(_))
        ));
    }

    #[test]
    fn test_bad_sender_rejected() {
        let mut s = settings();
        s.address = "nope".into();
        assert!(SmtpMailer::new(&s).is_err());
    }
}
