//! Async HTTP client wrapping reqwest.
//!
//! One request per call. Retries belong to the poll loop, not here.

use crate::types::{MonitorError, MonitorResult};
use std::time::Duration;

/// Browser-like user agent; the timetable rejects obvious bots.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                              AppleWebKit/537.36 (KHTML, like Gecko) \
                              Chrome/122.0.0.0 Safari/537.36";

/// Response from an HTTP request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client for the timetable fetcher.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a client with the browser user agent and a fixed timeout.
    pub fn new(timeout: Duration) -> MonitorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MonitorError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    /// POST url-encoded form fields. Repeated keys are sent in order.
    ///
    /// Non-success statuses are returned, not raised; the caller decides.
    pub async fn post_form(
        &self,
        url: &str,
        form_fields: &[(String, String)],
    ) -> MonitorResult<HttpResponse> {
        let r = self
            .client
            .post(url)
            .timeout(self.timeout)
            .form(form_fields)
            .send()
            .await
            .map_err(|e| MonitorError::Transport(describe(&e)))?;

        let status = r.status().as_u16();
        let final_url = r.url().to_string();
        let body = r
            .text()
            .await
            .map_err(|e| MonitorError::Transport(describe(&e)))?;

        Ok(HttpResponse {
            final_url,
            status,
            body,
        })
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}
