//! Locate a CRN in the timetable's flat `<td>` sequence and read the
//! limit/enrollment cells at fixed offsets after it.
//!
//! The timetable row reads: CRN, Subj, Num, Sec, Title, Text, Xlist,
//! Period Code, Period, Room, Building, Instructor, WC, Dist, Lang Req,
//! Lim, Enrl, ... so with the CRN at index `i`, Lim sits at `i + 15` and
//! Enrl at `i + 16`. Nothing else about the table is validated.

use crate::types::{Enrollment, MonitorError, MonitorResult};
use scraper::{Html, Selector};

/// Offsets of the limit and enrollment cells relative to the CRN cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub limit_offset: usize,
    pub enrolled_offset: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            limit_offset: 15,
            enrolled_offset: 16,
        }
    }
}

impl ColumnLayout {
    pub fn new(limit_offset: usize, enrolled_offset: usize) -> MonitorResult<Self> {
        if limit_offset == 0 || enrolled_offset == 0 {
            return Err(MonitorError::Config(
                "column offsets must point past the CRN cell".into(),
            ));
        }
        if limit_offset == enrolled_offset {
            return Err(MonitorError::Config(format!(
                "limit and enrolled offsets must differ (both {limit_offset})"
            )));
        }
        Ok(Self {
            limit_offset,
            enrolled_offset,
        })
    }

    /// Cells needed from the CRN cell onward, the CRN cell included.
    pub fn span(&self) -> usize {
        self.limit_offset.max(self.enrolled_offset) + 1
    }
}

/// Extracts `(enrolled, limit)` for one CRN.
#[derive(Debug, Clone)]
pub struct EnrollmentExtractor {
    crn: String,
    columns: ColumnLayout,
}

impl EnrollmentExtractor {
    pub fn new(crn: impl Into<String>, columns: ColumnLayout) -> Self {
        Self {
            crn: crn.into(),
            columns,
        }
    }

    /// Parse markup and read the target row.
    pub fn extract(&self, html: &str) -> MonitorResult<Enrollment> {
        self.locate(&cell_texts(html))
    }

    /// Scan an already-flattened cell sequence. Only the first matching
    /// cell is considered.
    pub fn locate(&self, cells: &[String]) -> MonitorResult<Enrollment> {
        let Some(idx) = cells.iter().position(|c| c == &self.crn) else {
            return Err(MonitorError::NotFound {
                crn: self.crn.clone(),
            });
        };

        let remaining = cells.len() - idx;
        if remaining < self.columns.span() {
            return Err(MonitorError::Parse(format!(
                "found CRN {} but only {remaining} cell(s) follow, need {}",
                self.crn,
                self.columns.span()
            )));
        }

        let limit = parse_count(&cells[idx + self.columns.limit_offset], "Lim")?;
        let enrolled = parse_count(&cells[idx + self.columns.enrolled_offset], "Enrl")?;
        Ok(Enrollment::new(enrolled, limit))
    }
}

/// Every `<td>` in document order, each reduced to its whitespace-stripped
/// text fragments joined together.
pub fn cell_texts(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(td) = Selector::parse("td") else {
        return Vec::new();
    };

    document
        .select(&td)
        .map(|cell| {
            cell.text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<String>()
        })
        .collect()
}

fn parse_count(text: &str, column: &str) -> MonitorResult<u32> {
    text.parse::<u32>()
        .map_err(|e| MonitorError::Parse(format!("{column} cell {text:?} is not a count: {e}")))
}
