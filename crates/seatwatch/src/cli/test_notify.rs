//! Send one test notification through every channel.

use crate::config::MonitorConfig;
use crate::notify::Notifier;
use anyhow::{Context, Result};
use tracing::info;

pub async fn run(cfg: &MonitorConfig) -> Result<()> {
    let notifier = Notifier::from_config(cfg).context("cannot set up notifications")?;
    let title = format!("seatwatch test: {}", cfg.course.name);
    let message = format!("Test notification for CRN {}", cfg.course.crn);

    if let Some(friends) = notifier.send(&title, &message).await {
        if let Some(email) = &cfg.email {
            info!(
                "waiting {} seconds for the friend email",
                email.friend_delay.as_secs()
            );
        }
        friends.await.context("friend email task panicked")?;
    }
    Ok(())
}
