//! Extraction of enrollment figures from timetable markup.

pub mod enrollment;

pub use enrollment::{cell_texts, ColumnLayout, EnrollmentExtractor};
