//! Loop controller.
//!
//! One poll in flight at a time. Failures back off exponentially; any
//! success resets to the base interval. Every poll that sees an open seat
//! notifies, not just the first one after the section was full.

use crate::acquisition::EnrollmentSource;
use crate::config::{CourseTarget, PollSettings};
use crate::monitor::state::{backoff, MonitorState, Transition};
use crate::notify::Alert;
use crate::types::{Enrollment, MonitorError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{error, info, warn};

/// What one poll produced.
#[derive(Debug)]
pub enum PollOutcome {
    Observed {
        enrollment: Enrollment,
        transition: Transition,
    },
    Failed(MonitorError),
}

/// A poll outcome plus how long to wait before the next one.
#[derive(Debug)]
pub struct StepReport {
    pub outcome: PollOutcome,
    pub wait: Duration,
}

pub struct Monitor {
    source: Arc<dyn EnrollmentSource>,
    alert: Arc<dyn Alert>,
    course: CourseTarget,
    poll: PollSettings,
    state: MonitorState,
}

impl Monitor {
    pub fn new(
        source: Arc<dyn EnrollmentSource>,
        alert: Arc<dyn Alert>,
        course: CourseTarget,
        poll: PollSettings,
    ) -> Self {
        Self {
            source,
            alert,
            course,
            poll,
            state: MonitorState::default(),
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Poll once, update state, notify if a seat is open.
    pub async fn step(&mut self) -> StepReport {
        let enrollment = match self.source.poll().await {
            Ok(enrollment) => enrollment,
            Err(e) => return self.fail(e),
        };

        self.state.record_success();
        info!(
            "{} — Enrolled: {} / Limit: {}",
            self.course.name, enrollment.enrolled, enrollment.limit
        );

        let transition = self.state.observe(enrollment);
        match transition {
            Transition::Opened { spots } | Transition::StillOpen { spots } => {
                let message = format!(
                    "{spots} spot(s) open! Enrolled: {}/{}",
                    enrollment.enrolled, enrollment.limit
                );
                info!("*** SPOT AVAILABLE *** {message}");
                let title = format!("SPOT OPEN: {}", self.course.name);
                self.alert.notify(&title, &message).await;
            }
            Transition::FullAgain => info!("Class is full again."),
            Transition::StillFull => {}
        }

        StepReport {
            outcome: PollOutcome::Observed {
                enrollment,
                transition,
            },
            wait: self.poll.interval,
        }
    }

    fn fail(&mut self, e: MonitorError) -> StepReport {
        let failures = self.state.record_failure();
        let wait = backoff(self.poll.interval, failures, self.poll.max_backoff);
        match &e {
            MonitorError::Transport(_) => {
                error!(
                    kind = e.kind(),
                    "Request error: {e}. Retrying in {} seconds.",
                    wait.as_secs()
                );
            }
            _ => {
                warn!(kind = e.kind(), "{e}");
                error!("Failed to fetch data. Retrying in {} seconds.", wait.as_secs());
            }
        }
        StepReport {
            outcome: PollOutcome::Failed(e),
            wait,
        }
    }

    /// Poll until `shutdown` is notified. An in-flight poll or sleep is
    /// abandoned on shutdown.
    pub async fn run(mut self, shutdown: Arc<Notify>) {
        info!(
            "Starting seat monitor for {} (CRN {})",
            self.course.name, self.course.crn
        );
        info!("Checking every {} seconds", self.poll.interval.as_secs());

        loop {
            let report = tokio::select! {
                biased;
                _ = shutdown.notified() => break,
                report = self.step() => report,
            };

            tokio::select! {
                biased;
                _ = shutdown.notified() => break,
                _ = tokio::time::sleep(report.wait) => {}
            }
        }

        info!("Stopped by user.");
    }
}
