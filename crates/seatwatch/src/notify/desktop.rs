//! Local desktop alerts via the platform's notification command.

use crate::config::DesktopSettings;
use crate::types::{MonitorError, MonitorResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

/// Upper bound on one notifier process; a hung one is killed.
const ALERT_TIMEOUT: Duration = Duration::from_secs(10);

/// A best-effort local alert.
#[async_trait]
pub trait DesktopAlert: Send + Sync {
    async fn show(&self, title: &str, message: &str) -> MonitorResult<()>;
}

/// macOS: `osascript -e 'display notification ...'`.
pub struct OsascriptAlert {
    program: PathBuf,
    sound: String,
}

impl OsascriptAlert {
    pub fn new(program: PathBuf, sound: impl Into<String>) -> Self {
        Self {
            program,
            sound: sound.into(),
        }
    }

    pub fn script(&self, title: &str, message: &str) -> String {
        format!(
            "display notification \"{}\" with title \"{}\" sound name \"{}\"",
            applescript_escape(message),
            applescript_escape(title),
            applescript_escape(&self.sound)
        )
    }
}

#[async_trait]
impl DesktopAlert for OsascriptAlert {
    async fn show(&self, title: &str, message: &str) -> MonitorResult<()> {
        let script = self.script(title, message);
        run(Command::new(&self.program).arg("-e").arg(script), ALERT_TIMEOUT).await
    }
}

/// Linux desktops: `notify-send <title> <message>`.
pub struct NotifySendAlert {
    program: PathBuf,
}

impl NotifySendAlert {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }
}

#[async_trait]
impl DesktopAlert for NotifySendAlert {
    async fn show(&self, title: &str, message: &str) -> MonitorResult<()> {
        run(Command::new(&self.program).arg(title).arg(message), ALERT_TIMEOUT).await
    }
}

/// Used when alerts are disabled or no notifier exists on this machine.
pub struct NoopAlert;

#[async_trait]
impl DesktopAlert for NoopAlert {
    async fn show(&self, _title: &str, _message: &str) -> MonitorResult<()> {
        Ok(())
    }
}

/// Pick the alert mechanism available on this machine.
pub fn platform_alert(settings: &DesktopSettings) -> Arc<dyn DesktopAlert> {
    if !settings.enabled {
        return Arc::new(NoopAlert);
    }
    if cfg!(target_os = "macos") {
        if let Ok(program) = which::which("osascript") {
            return Arc::new(OsascriptAlert::new(program, settings.sound.clone()));
        }
    }
    if let Ok(program) = which::which("notify-send") {
        return Arc::new(NotifySendAlert::new(program));
    }
    tracing::debug!("no desktop notifier found; desktop alerts disabled");
    Arc::new(NoopAlert)
}

async fn run(cmd: &mut Command, limit: Duration) -> MonitorResult<()> {
    let output = tokio::time::timeout(limit, cmd.kill_on_drop(true).output())
        .await
        .map_err(|_| MonitorError::Notification(format!("desktop alert timed out after {limit:?}")))?
        .map_err(|e| MonitorError::Notification(format!("desktop alert failed to start: {e}")))?;
    if output.status.success() {
        Ok(())
    } else {
        Err(MonitorError::Notification(format!(
            "desktop alert exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

/// Escape text for an AppleScript double-quoted string literal.
pub fn applescript_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
