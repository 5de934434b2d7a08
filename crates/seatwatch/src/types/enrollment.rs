//! Enrollment snapshot for a single course section.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of a section's enrollment against its limit.
///
/// Produced fresh on every poll and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub enrolled: u32,
    pub limit: u32,
}

impl Enrollment {
    pub fn new(enrolled: u32, limit: u32) -> Self {
        Self { enrolled, limit }
    }

    /// True when at least one seat is free.
    pub fn is_open(&self) -> bool {
        self.enrolled < self.limit
    }

    /// Free seats; zero for a full or over-enrolled section.
    pub fn open_spots(&self) -> u32 {
        self.limit.saturating_sub(self.enrolled)
    }
}

/// Result of a one-off `check`, printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct PollReport {
    pub crn: String,
    pub course: String,
    pub enrolled: u32,
    pub limit: u32,
    pub open_spots: u32,
    pub checked_at: DateTime<Utc>,
}

impl PollReport {
    pub fn new(crn: &str, course: &str, enrollment: Enrollment) -> Self {
        Self {
            crn: crn.to_string(),
            course: course.to_string(),
            enrolled: enrollment.enrolled,
            limit: enrollment.limit,
            open_spots: enrollment.open_spots(),
            checked_at: Utc::now(),
        }
    }
}
