//! Timetable fetcher: one form submission per poll.

use crate::acquisition::http_client::HttpClient;
use crate::config::MonitorConfig;
use crate::extraction::EnrollmentExtractor;
use crate::types::{Enrollment, MonitorError, MonitorResult};
use async_trait::async_trait;

/// Fixed fields of the timetable search form.
const FIXED_FIELDS: &[(&str, &str)] = &[
    ("distribradio", "alldistribs"),
    ("subjectradio", "selectsubjects"),
    ("termradio", "selectterms"),
    ("hoursradio", "allhours"),
    ("periods", "no_value"),
    ("distribs", "no_value"),
    ("distribs_i", "no_value"),
    ("distribs_wc", "no_value"),
    ("distribs_lang", "no_value"),
    ("sortorder", "dept"),
    ("deliveryradio", "alldelivery"),
    ("deliverymodes", "no_value"),
    ("pmode", "public"),
    ("term", ""),
    ("levl", ""),
    ("fys", "n"),
    ("wrt", "n"),
    ("pe", "n"),
    ("review", "n"),
    ("crnl", "no_value"),
    ("classyear", "2008"),
    ("searchtype", "Subject Area(s)"),
];

/// Something that can report the current enrollment of the watched section.
#[async_trait]
pub trait EnrollmentSource: Send + Sync {
    /// Fetch and parse once. No internal retries.
    async fn poll(&self) -> MonitorResult<Enrollment>;
}

/// Build the form body for a term/department search.
///
/// `terms` and `depts` are multi-selects, sent as repeated keys with a
/// leading `no_value` the way the browser form submits them.
pub fn form_payload(term: &str, department: &str) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = FIXED_FIELDS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    for (key, value) in [("terms", term), ("depts", department)] {
        fields.push((key.to_string(), "no_value".to_string()));
        fields.push((key.to_string(), value.to_string()));
    }
    fields
}

/// Fetches the public timetable and extracts the target section.
pub struct TimetableSource {
    client: HttpClient,
    url: String,
    form: Vec<(String, String)>,
    extractor: EnrollmentExtractor,
}

impl TimetableSource {
    /// Fails only if the HTTP client cannot be built.
    pub fn new(cfg: &MonitorConfig) -> MonitorResult<Self> {
        Ok(Self {
            client: HttpClient::new(cfg.request_timeout)?,
            url: cfg.timetable_url.clone(),
            form: form_payload(&cfg.course.term, &cfg.course.department),
            extractor: EnrollmentExtractor::new(cfg.course.crn.clone(), cfg.columns),
        })
    }

    /// Fetch the raw timetable markup.
    pub async fn fetch(&self) -> MonitorResult<String> {
        let resp = self.client.post_form(&self.url, &self.form).await?;
        if !resp.is_success() {
            return Err(MonitorError::Transport(format!(
                "HTTP {} from {}",
                resp.status, resp.final_url
            )));
        }
        tracing::debug!(
            "fetched {} bytes from {}",
            resp.body.len(),
            resp.final_url
        );
        Ok(resp.body)
    }
}

#[async_trait]
impl EnrollmentSource for TimetableSource {
    async fn poll(&self) -> MonitorResult<Enrollment> {
        let html = self.fetch().await?;
        self.extractor.extract(&html)
    }
}
