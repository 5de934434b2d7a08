//! Run the poll/notify loop until Ctrl-C.

use crate::acquisition::TimetableSource;
use crate::config::MonitorConfig;
use crate::monitor::Monitor;
use crate::notify::Notifier;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{info, warn};

pub async fn run(cfg: MonitorConfig) -> Result<()> {
    let notifier = Notifier::from_config(&cfg).context("cannot set up notifications")?;
    let source = TimetableSource::new(&cfg).context("cannot set up the timetable fetcher")?;
    let monitor = Monitor::new(
        Arc::new(source),
        Arc::new(notifier),
        cfg.course.clone(),
        cfg.poll,
    );

    let shutdown = Arc::new(Notify::new());
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received shutdown signal");
                shutdown_signal.notify_one();
            }
            Err(e) => warn!("cannot listen for Ctrl-C: {e}"),
        }
    });

    monitor.run(shutdown).await;
    Ok(())
}
