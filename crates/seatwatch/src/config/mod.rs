//! Configuration loading and resolution.
//!
//! Layers, lowest to highest precedence: built-in defaults, an optional JSON
//! config file, `SEATWATCH_*` environment variables, CLI overrides. The
//! result is an immutable [`MonitorConfig`] handed to the fetcher and
//! notifier at construction.

use crate::extraction::ColumnLayout;
use crate::types::{MonitorError, MonitorResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CRN: &str = "31322";
pub const DEFAULT_COURSE_NAME: &str = "COSC 031 - Algorithms";
pub const DEFAULT_TERM: &str = "202603";
pub const DEFAULT_DEPARTMENT: &str = "COSC";
pub const DEFAULT_TIMETABLE_URL: &str =
    "https://oracle-www.dartmouth.edu/dart/groucho/timetable.display_courses";
pub const DEFAULT_PORTAL_URL: &str =
    "https://oracle-www.dartmouth.edu/dart/groucho/timetable.main";

const DEFAULT_INTERVAL_SECS: u64 = 5 * 60;
const DEFAULT_MAX_BACKOFF_SECS: u64 = 30 * 60;
const DEFAULT_FRIEND_DELAY_SECS: u64 = 2 * 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_DESKTOP_SOUND: &str = "Glass";
const DEFAULT_LOG_FILE: &str = "monitor.log";

const ENV_PREFIX: &str = "SEATWATCH_";

/// The course section being watched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseTarget {
    pub crn: String,
    pub name: String,
    pub term: String,
    pub department: String,
}

/// Poll cadence and failure backoff ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_backoff: Duration,
}

/// SMTP account and recipients.
#[derive(Clone)]
pub struct EmailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub address: String,
    pub app_password: String,
    pub friends: Vec<String>,
    pub friend_delay: Duration,
    pub portal_url: String,
}

impl std::fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSettings")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("address", &self.address)
            .field("app_password", &"<redacted>")
            .field("friends", &self.friends)
            .field("friend_delay", &self.friend_delay)
            .field("portal_url", &self.portal_url)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopSettings {
    pub enabled: bool,
    pub sound: String,
}

/// Fully resolved, validated configuration.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub course: CourseTarget,
    pub timetable_url: String,
    pub request_timeout: Duration,
    pub poll: PollSettings,
    /// Absent when no credentials were supplied; `check` works without them.
    pub email: Option<EmailSettings>,
    pub desktop: DesktopSettings,
    pub columns: ColumnLayout,
    pub log_file: PathBuf,
}

/// Raw configuration layer. Every field is optional so layers can be overlaid.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub crn: Option<String>,
    pub course_name: Option<String>,
    pub term: Option<String>,
    pub department: Option<String>,
    pub timetable_url: Option<String>,
    pub portal_url: Option<String>,
    pub interval_secs: Option<u64>,
    pub max_backoff_secs: Option<u64>,
    pub friend_delay_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub email_address: Option<String>,
    pub email_app_password: Option<String>,
    pub friend_emails: Option<Vec<String>>,
    pub desktop_alerts: Option<bool>,
    pub desktop_sound: Option<String>,
    pub limit_offset: Option<usize>,
    pub enrolled_offset: Option<usize>,
    pub log_file: Option<PathBuf>,
}

/// Overrides supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub crn: Option<String>,
    pub term: Option<String>,
    pub department: Option<String>,
    pub interval_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl From<&CliOverrides> for ConfigFile {
    fn from(o: &CliOverrides) -> Self {
        ConfigFile {
            crn: o.crn.clone(),
            term: o.term.clone(),
            department: o.department.clone(),
            interval_secs: o.interval_secs,
            log_file: o.log_file.clone(),
            ..ConfigFile::default()
        }
    }
}

impl ConfigFile {
    /// Read a JSON config file.
    pub fn read(path: &Path) -> MonitorResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            MonitorError::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            MonitorError::Config(format!("invalid config file {}: {e}", path.display()))
        })
    }

    /// Build a layer from `SEATWATCH_*` variables using the given lookup.
    pub fn from_env<F>(lookup: F) -> MonitorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(ConfigFile {
            crn: get("CRN"),
            course_name: get("COURSE_NAME"),
            term: get("TERM"),
            department: get("DEPT"),
            timetable_url: get("TIMETABLE_URL"),
            portal_url: get("PORTAL_URL"),
            interval_secs: parse_env(&get, "INTERVAL_SECS")?,
            max_backoff_secs: parse_env(&get, "MAX_BACKOFF_SECS")?,
            friend_delay_secs: parse_env(&get, "FRIEND_DELAY_SECS")?,
            request_timeout_secs: parse_env(&get, "REQUEST_TIMEOUT_SECS")?,
            smtp_host: get("SMTP_HOST"),
            smtp_port: parse_env(&get, "SMTP_PORT")?,
            email_address: get("EMAIL_ADDRESS"),
            email_app_password: get("EMAIL_APP_PASSWORD"),
            friend_emails: get("FRIEND_EMAILS").map(|v| split_list(&v)),
            desktop_alerts: parse_env(&get, "DESKTOP_ALERTS")?,
            desktop_sound: get("DESKTOP_SOUND"),
            limit_offset: parse_env(&get, "LIMIT_OFFSET")?,
            enrolled_offset: parse_env(&get, "ENROLLED_OFFSET")?,
            log_file: get("LOG_FILE").map(PathBuf::from),
        })
    }

    /// Overlay `top` on `self`; fields set in `top` win.
    pub fn overlay(self, top: ConfigFile) -> ConfigFile {
        ConfigFile {
            crn: top.crn.or(self.crn),
            course_name: top.course_name.or(self.course_name),
            term: top.term.or(self.term),
            department: top.department.or(self.department),
            timetable_url: top.timetable_url.or(self.timetable_url),
            portal_url: top.portal_url.or(self.portal_url),
            interval_secs: top.interval_secs.or(self.interval_secs),
            max_backoff_secs: top.max_backoff_secs.or(self.max_backoff_secs),
            friend_delay_secs: top.friend_delay_secs.or(self.friend_delay_secs),
            request_timeout_secs: top.request_timeout_secs.or(self.request_timeout_secs),
            smtp_host: top.smtp_host.or(self.smtp_host),
            smtp_port: top.smtp_port.or(self.smtp_port),
            email_address: top.email_address.or(self.email_address),
            email_app_password: top.email_app_password.or(self.email_app_password),
            friend_emails: top.friend_emails.or(self.friend_emails),
            desktop_alerts: top.desktop_alerts.or(self.desktop_alerts),
            desktop_sound: top.desktop_sound.or(self.desktop_sound),
            limit_offset: top.limit_offset.or(self.limit_offset),
            enrolled_offset: top.enrolled_offset.or(self.enrolled_offset),
            log_file: top.log_file.or(self.log_file),
        }
    }
}

impl MonitorConfig {
    /// Resolve configuration from all layers.
    pub fn load(explicit_path: Option<&Path>, overrides: &CliOverrides) -> MonitorResult<Self> {
        let file = match resolve_config_path(explicit_path) {
            Some(path) => ConfigFile::read(&path)?,
            None => ConfigFile::default(),
        };
        let env = ConfigFile::from_env(|name| std::env::var(name).ok())?;
        Self::from_layers(file.overlay(env).overlay(overrides.into()))
    }

    /// Apply defaults to a merged layer and validate the result.
    pub fn from_layers(raw: ConfigFile) -> MonitorResult<Self> {
        let course = CourseTarget {
            crn: required(raw.crn, DEFAULT_CRN, "crn")?,
            name: raw
                .course_name
                .unwrap_or_else(|| DEFAULT_COURSE_NAME.to_string()),
            term: required(raw.term, DEFAULT_TERM, "term")?,
            department: required(raw.department, DEFAULT_DEPARTMENT, "department")?,
        };

        let interval = raw.interval_secs.unwrap_or(DEFAULT_INTERVAL_SECS);
        let max_backoff = raw
            .max_backoff_secs
            .unwrap_or(DEFAULT_MAX_BACKOFF_SECS.max(interval));
        if interval == 0 {
            return Err(MonitorError::Config("interval_secs must be > 0".into()));
        }
        if max_backoff < interval {
            return Err(MonitorError::Config(format!(
                "max_backoff_secs ({max_backoff}) must be >= interval_secs ({interval})"
            )));
        }

        let request_timeout = raw
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_timeout == 0 {
            return Err(MonitorError::Config(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        let defaults = ColumnLayout::default();
        let columns = ColumnLayout::new(
            raw.limit_offset.unwrap_or(defaults.limit_offset),
            raw.enrolled_offset.unwrap_or(defaults.enrolled_offset),
        )?;

        let address = raw.email_address.map(|v| v.trim().to_string());
        let app_password = raw.email_app_password.map(|v| v.trim().to_string());
        if address.as_deref() == Some("") {
            return Err(MonitorError::Config("email_address must not be empty".into()));
        }
        if app_password.as_deref() == Some("") {
            return Err(MonitorError::Config(
                "email_app_password must not be empty".into(),
            ));
        }

        let email = match (address, app_password) {
            (Some(address), Some(app_password)) => Some(EmailSettings {
                smtp_host: raw
                    .smtp_host
                    .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                smtp_port: raw.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
                address,
                app_password,
                friends: raw
                    .friend_emails
                    .unwrap_or_default()
                    .into_iter()
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty())
                    .collect(),
                friend_delay: Duration::from_secs(
                    raw.friend_delay_secs.unwrap_or(DEFAULT_FRIEND_DELAY_SECS),
                ),
                portal_url: raw
                    .portal_url
                    .unwrap_or_else(|| DEFAULT_PORTAL_URL.to_string()),
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(MonitorError::Config(
                    "email_address is set but email_app_password is missing".into(),
                ))
            }
            (None, Some(_)) => {
                return Err(MonitorError::Config(
                    "email_app_password is set but email_address is missing".into(),
                ))
            }
        };

        Ok(MonitorConfig {
            course,
            timetable_url: raw
                .timetable_url
                .unwrap_or_else(|| DEFAULT_TIMETABLE_URL.to_string()),
            request_timeout: Duration::from_secs(request_timeout),
            poll: PollSettings {
                interval: Duration::from_secs(interval),
                max_backoff: Duration::from_secs(max_backoff),
            },
            email,
            desktop: DesktopSettings {
                enabled: raw.desktop_alerts.unwrap_or(true),
                sound: raw
                    .desktop_sound
                    .unwrap_or_else(|| DEFAULT_DESKTOP_SOUND.to_string()),
            },
            columns,
            log_file: raw
                .log_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        })
    }

    /// Email settings, or a config error for commands that must send mail.
    pub fn require_email(&self) -> MonitorResult<&EmailSettings> {
        self.email.as_ref().ok_or_else(|| {
            MonitorError::Config(format!(
                "email credentials missing: set {ENV_PREFIX}EMAIL_ADDRESS and \
                 {ENV_PREFIX}EMAIL_APP_PASSWORD or add them to the config file"
            ))
        })
    }
}

/// Resolve the config file path: explicit flag, then `SEATWATCH_CONFIG`,
/// then `~/.seatwatch/config.json` if it exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var("SEATWATCH_CONFIG") {
        if !env_path.trim().is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    let default = dirs::home_dir()?.join(".seatwatch").join("config.json");
    default.exists().then_some(default)
}

fn required(value: Option<String>, default: &str, name: &str) -> MonitorResult<String> {
    let value = value.unwrap_or_else(|| default.to_string());
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MonitorError::Config(format!("{name} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn parse_env<T, G>(get: &G, name: &str) -> MonitorResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(v) => v.parse::<T>().map(Some).map_err(|e| {
            MonitorError::Config(format!("{ENV_PREFIX}{name}={v:?} is invalid: {e}"))
        }),
        None => Ok(None),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults_match_original_monitor() {
        let cfg = MonitorConfig::from_layers(ConfigFile::default()).unwrap();
        assert_eq!(cfg.course.crn, "31322");
        assert_eq!(cfg.course.term, "202603");
        assert_eq!(cfg.course.department, "COSC");
        assert_eq!(cfg.poll.interval, Duration::from_secs(300));
        assert_eq!(cfg.poll.max_backoff, Duration::from_secs(1800));
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert_eq!(cfg.columns.limit_offset, 15);
        assert_eq!(cfg.columns.enrolled_offset, 16);
        assert_eq!(cfg.desktop.sound, "Glass");
        assert!(cfg.email.is_none());
        assert!(cfg.require_email().is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = ConfigFile {
            crn: Some("11111".into()),
            interval_secs: Some(60),
            ..ConfigFile::default()
        };
        let env = ConfigFile::from_env(env_of(&[
            ("SEATWATCH_CRN", "22222"),
            ("SEATWATCH_EMAIL_ADDRESS", "me@example.com"),
            ("SEATWATCH_EMAIL_APP_PASSWORD", "app-pass"),
            ("SEATWATCH_FRIEND_EMAILS", "a@example.com, b@example.com,,"),
        ]))
        .unwrap();

        let cfg = MonitorConfig::from_layers(file.overlay(env)).unwrap();
        assert_eq!(cfg.course.crn, "22222");
        assert_eq!(cfg.poll.interval, Duration::from_secs(60));

        let email = cfg.require_email().unwrap();
        assert_eq!(email.address, "me@example.com");
        assert_eq!(email.smtp_host, "smtp.gmail.com");
        assert_eq!(email.smtp_port, 465);
        assert_eq!(email.friends, vec!["a@example.com", "b@example.com"]);
        assert_eq!(email.friend_delay, Duration::from_secs(120));
    }

    #[test]
    fn test_cli_overrides_env() {
        let env = ConfigFile::from_env(env_of(&[("SEATWATCH_TERM", "202601")])).unwrap();
        let cli = CliOverrides {
            term: Some("202609".into()),
            ..CliOverrides::default()
        };
        let cfg = MonitorConfig::from_layers(env.overlay((&cli).into())).unwrap();
        assert_eq!(cfg.course.term, "202609");
    }

    #[test]
    fn test_half_credentials_fail_fast() {
        let raw = ConfigFile {
            email_address: Some("me@example.com".into()),
            ..ConfigFile::default()
        };
        let err = MonitorConfig::from_layers(raw).unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));
    }

    #[test]
    fn test_blank_credentials_fail_fast() {
        let raw = ConfigFile {
            email_address: Some("".into()),
            email_app_password: Some("".into()),
            ..ConfigFile::default()
        };
        let err = MonitorConfig::from_layers(raw).unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));

        let raw = ConfigFile {
            email_address: Some("me@example.com".into()),
            email_app_password: Some("   ".into()),
            ..ConfigFile::default()
        };
        let err = MonitorConfig::from_layers(raw).unwrap_err();
        assert!(err.to_string().contains("email_app_password"));
    }

    #[test]
    fn test_credentials_are_trimmed() {
        let raw = ConfigFile {
            email_address: Some("  me@example.com ".into()),
            email_app_password: Some("app-pass\n".into()),
            ..ConfigFile::default()
        };
        let cfg = MonitorConfig::from_layers(raw).unwrap();
        let email = cfg.require_email().unwrap();
        assert_eq!(email.address, "me@example.com");
        assert_eq!(email.app_password, "app-pass");
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let err = ConfigFile::from_env(env_of(&[("SEATWATCH_INTERVAL_SECS", "five")])).unwrap_err();
        assert!(err.to_string().contains("SEATWATCH_INTERVAL_SECS"));

        let raw = ConfigFile {
            interval_secs: Some(600),
            max_backoff_secs: Some(300),
            ..ConfigFile::default()
        };
        assert!(MonitorConfig::from_layers(raw).is_err());

        let raw = ConfigFile {
            interval_secs: Some(0),
            ..ConfigFile::default()
        };
        assert!(MonitorConfig::from_layers(raw).is_err());
    }

    #[test]
    fn test_blank_crn_rejected() {
        let raw = ConfigFile {
            crn: Some("   ".into()),
            ..ConfigFile::default()
        };
        assert!(MonitorConfig::from_layers(raw).is_err());
    }

    #[test]
    fn test_read_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"crn": "40404", "course_name": "MATH 022", "friend_emails": ["x@example.com"]}"#,
        )
        .unwrap();

        let file = ConfigFile::read(&path).unwrap();
        assert_eq!(file.crn.as_deref(), Some("40404"));
        assert_eq!(file.friend_emails, Some(vec!["x@example.com".to_string()]));
        assert_eq!(resolve_config_path(Some(path.as_path())), Some(path.clone()));
    }

    #[test]
    fn test_unknown_config_field_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"crm": "40404"}"#).unwrap();
        assert!(matches!(
            ConfigFile::read(&path),
            Err(MonitorError::Config(_))
        ));
    }

    #[test]
    fn test_password_redacted_in_debug() {
        let raw = ConfigFile {
            email_address: Some("me@example.com".into()),
            email_app_password: Some("hunter2hunter2".into()),
            ..ConfigFile::default()
        };
        let cfg = MonitorConfig::from_layers(raw).unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("hunter2hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
