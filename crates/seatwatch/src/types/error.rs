//! Error taxonomy for the seat monitor.

/// All errors that can occur while polling, parsing, or notifying.
#[derive(thiserror::Error, Debug)]
pub enum MonitorError {
    /// Timeout, connection failure, or a non-success HTTP status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The target CRN does not appear anywhere in the timetable table.
    #[error("CRN {crn} not found in timetable response")]
    NotFound { crn: String },

    /// The CRN was found but the limit/enrollment cells were missing or not numeric.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Desktop alert or email delivery failed.
    #[error("Notification error: {0}")]
    Notification(String),

    /// Invalid or missing configuration. Only raised at startup.
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MonitorError {
    /// Short label for the `kind` field of poll-failure log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            MonitorError::Transport(_) => "transport",
            MonitorError::NotFound { .. } => "not_found",
            MonitorError::Parse(_) => "parse",
            MonitorError::Notification(_) => "notification",
            MonitorError::Config(_) => "config",
            MonitorError::Io(_) => "io",
        }
    }
}

impl From<lettre::error::Error> for MonitorError {
    fn from(e: lettre::error::Error) -> Self {
        MonitorError::Notification(e.to_string())
    }
}

impl From<lettre::address::AddressError> for MonitorError {
    fn from(e: lettre::address::AddressError) -> Self {
        MonitorError::Notification(format!("invalid address: {e}"))
    }
}

impl From<lettre::transport::smtp::Error> for MonitorError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        MonitorError::Notification(e.to_string())
    }
}

pub type MonitorResult<T> = Result<T, MonitorError>;
