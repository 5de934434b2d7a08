//! Network acquisition: the HTTP client and the timetable fetcher.

pub mod http_client;
pub mod timetable;

pub use http_client::{HttpClient, HttpResponse};
pub use timetable::{EnrollmentSource, TimetableSource};
