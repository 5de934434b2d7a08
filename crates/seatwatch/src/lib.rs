// Copyright 2026 Seatwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Seatwatch — polls a public course timetable and alerts when a seat opens.
//!
//! fetch → parse → compare → notify → sleep, until interrupted.

pub mod acquisition;
pub mod cli;
pub mod config;
pub mod extraction;
pub mod logging;
pub mod monitor;
pub mod notify;
pub mod types;

pub use acquisition::{EnrollmentSource, TimetableSource};
pub use config::MonitorConfig;
pub use monitor::Monitor;
pub use notify::{Alert, Notifier};
pub use types::{Enrollment, MonitorError, MonitorResult};
