//! Seat-open notifications: a desktop alert, an immediate email to the
//! account owner, and a delayed email to the friend list.
//!
//! Delivery failures are logged and swallowed. Nothing here can stop the
//! poll loop.

pub mod desktop;
pub mod email;

use crate::config::MonitorConfig;
use crate::types::MonitorResult;
use async_trait::async_trait;
use desktop::{platform_alert, DesktopAlert};
use email::{Mailer, OutgoingEmail, SmtpMailer};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Receives seat-open alerts from the poll loop.
#[async_trait]
pub trait Alert: Send + Sync {
    async fn notify(&self, title: &str, message: &str);
}

/// Desktop + email notifier.
pub struct Notifier {
    desktop: Arc<dyn DesktopAlert>,
    mailer: Arc<dyn Mailer>,
    primary: String,
    friends: Vec<String>,
    friend_delay: Duration,
    portal_url: String,
}

impl Notifier {
    pub fn new(
        desktop: Arc<dyn DesktopAlert>,
        mailer: Arc<dyn Mailer>,
        primary: impl Into<String>,
        friends: Vec<String>,
        friend_delay: Duration,
        portal_url: impl Into<String>,
    ) -> Self {
        Self {
            desktop,
            mailer,
            primary: primary.into(),
            friends,
            friend_delay,
            portal_url: portal_url.into(),
        }
    }

    /// Build the SMTP and platform desktop channels. Fails without credentials.
    pub fn from_config(cfg: &MonitorConfig) -> MonitorResult<Self> {
        let email = cfg.require_email()?;
        let mailer = Arc::new(SmtpMailer::new(email)?);
        Ok(Self::new(
            platform_alert(&cfg.desktop),
            mailer,
            email.address.clone(),
            email.friends.clone(),
            email.friend_delay,
            email.portal_url.clone(),
        ))
    }

    /// Alert locally, email the primary recipient, then schedule the friend
    /// email. Returns as soon as the friend task is spawned; the handle is
    /// only for callers that want to wait on it.
    pub async fn send(&self, title: &str, message: &str) -> Option<JoinHandle<()>> {
        if let Err(e) = self.desktop.show(title, message).await {
            tracing::warn!("desktop alert failed: {e}");
        }

        let primary = OutgoingEmail::compose(
            title,
            message,
            &self.portal_url,
            vec![self.primary.clone()],
        );
        deliver(self.mailer.as_ref(), &primary).await;

        if self.friends.is_empty() {
            return None;
        }

        let friends = OutgoingEmail::compose(
            title,
            message,
            &self.portal_url,
            self.friends.clone(),
        );
        let mailer = Arc::clone(&self.mailer);
        let delay = self.friend_delay;
        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            deliver(mailer.as_ref(), &friends).await;
        }))
    }
}

#[async_trait]
impl Alert for Notifier {
    async fn notify(&self, title: &str, message: &str) {
        // Dropping the handle detaches the friend email.
        let _ = self.send(title, message).await;
    }
}

async fn deliver(mailer: &dyn Mailer, email: &OutgoingEmail) {
    match mailer.send(email).await {
        Ok(()) => tracing::info!("Email notification sent to {}", email.recipients()),
        Err(e) => tracing::warn!("Failed to send email to {}: {e}", email.recipients()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MonitorError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(tokio::time::Instant, OutgoingEmail)>>,
        fail_for: Option<String>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutgoingEmail) -> MonitorResult<()> {
            if self
                .fail_for
                .as_ref()
                .is_some_and(|r| email.to.contains(r))
            {
                return Err(MonitorError::Notification("smtp refused".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((tokio::time::Instant::now(), email.clone()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingDesktop {
        shown: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl DesktopAlert for RecordingDesktop {
        async fn show(&self, title: &str, message: &str) -> MonitorResult<()> {
            self.shown
                .lock()
                .unwrap()
                .push((title.to_string(), message.to_string()));
            if self.fail {
                Err(MonitorError::Notification("no display".into()))
            } else {
                Ok(())
            }
        }
    }

    fn notifier(
        desktop: Arc<RecordingDesktop>,
        mailer: Arc<RecordingMailer>,
        friends: &[&str],
    ) -> Notifier {
        Notifier::new(
            desktop,
            mailer,
            "me@example.com",
            friends.iter().map(|f| f.to_string()).collect(),
            Duration::from_secs(120),
            "https://example.com/portal",
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_friend_email_waits_for_delay() {
        let desktop = Arc::new(RecordingDesktop::default());
        let mailer = Arc::new(RecordingMailer::default());
        let n = notifier(desktop.clone(), mailer.clone(), &["a@example.com", "b@example.com"]);

        let start = tokio::time::Instant::now();
        let handle = n.send("SPOT OPEN", "1 spot(s) open!").await.unwrap();

        // send() returned before the delay elapsed: only the primary went out.
        {
            let sent = mailer.sent.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].1.to, vec!["me@example.com"]);
        }
        assert_eq!(desktop.shown.lock().unwrap().len(), 1);

        handle.await.unwrap();
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].1.to, vec!["a@example.com", "b@example.com"]);
        assert!(sent[1].0 - start >= Duration::from_secs(120));
        assert_eq!(sent[1].1.subject, sent[0].1.subject);
        assert_eq!(sent[1].1.body, sent[0].1.body);
    }

    #[tokio::test]
    async fn test_no_friends_no_task() {
        let mailer = Arc::new(RecordingMailer::default());
        let n = notifier(Arc::new(RecordingDesktop::default()), mailer.clone(), &[]);
        assert!(n.send("t", "m").await.is_none());
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_isolated() {
        let desktop = Arc::new(RecordingDesktop {
            fail: true,
            ..Default::default()
        });
        let mailer = Arc::new(RecordingMailer {
            fail_for: Some("me@example.com".into()),
            ..Default::default()
        });
        let n = notifier(desktop.clone(), mailer.clone(), &["a@example.com"]);

        let handle = n.send("t", "m").await.unwrap();
        assert!(mailer.sent.lock().unwrap().is_empty());

        handle.await.unwrap();
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.to, vec!["a@example.com"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_alert_trait_detaches() {
        let mailer = Arc::new(RecordingMailer::default());
        let n = notifier(
            Arc::new(RecordingDesktop::default()),
            mailer.clone(),
            &["a@example.com"],
        );
        n.notify("t", "m").await;
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);

        tokio::time::sleep(Duration::from_secs(121)).await;
        assert_eq!(mailer.sent.lock().unwrap().len(), 2);
    }
}
