//! Poll the timetable once and print the section's enrollment.

use crate::acquisition::{EnrollmentSource, TimetableSource};
use crate::config::MonitorConfig;
use crate::types::PollReport;
use anyhow::{Context, Result};

pub async fn run(cfg: &MonitorConfig, json: bool) -> Result<()> {
    let source = TimetableSource::new(cfg).context("cannot set up the timetable fetcher")?;
    let enrollment = source
        .poll()
        .await
        .with_context(|| format!("check failed for CRN {}", cfg.course.crn))?;

    let report = PollReport::new(&cfg.course.crn, &cfg.course.name, enrollment);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("  {} (CRN {})", report.course, report.crn);
        println!("  Enrolled: {} / Limit: {}", report.enrolled, report.limit);
        if report.open_spots > 0 {
            println!("  {} spot(s) open", report.open_spots);
        } else {
            println!("  Full");
        }
    }
    Ok(())
}
