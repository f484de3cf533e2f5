//! Run configuration and tracker credentials loaded from JSON files.

use serde::de::Deserializer;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};

pub const CONFIG_FILE: &str = "config.json";
pub const CREDENTIALS_FILE: &str = "jira_credentials.json";

fn default_shared_percentage() -> f64 {
    0.95
}

fn default_incidence_type_field() -> String {
    "customfield_15190".to_string()
}

fn default_row_capacity() -> usize {
    5000
}

fn default_page_size() -> u32 {
    jira_api::config::DEFAULT_PAGE_SIZE
}

fn default_stamp_cell() -> String {
    "E4".to_string()
}

/// Names of the spreadsheet tabs the report writes to.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TabNames {
    pub detail: String,
    pub summary: String,
    pub errors: String,
    pub index: String,
}

impl Default for TabNames {
    fn default() -> Self {
        Self {
            detail: "JIRADATA".to_string(),
            summary: "TASKSDATA".to_string(),
            errors: "Errores".to_string(),
            index: "Índice".to_string(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetConfig {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Report version this configuration targets, compared with a cell of the
/// index tab; a mismatch stops the run before anything is fetched.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VersionCheck {
    pub cell: String,
    pub version: String,
}

/// Represents the run configuration file: classification threshold, saved filter, team roster, tracker location and report layout.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    #[serde(default = "default_shared_percentage")]
    pub shared_percentage: f64,
    #[serde(deserialize_with = "string_or_number")]
    pub filter_id: String,
    #[serde(default)]
    pub team: Vec<String>,
    pub tracker_url: String,
    #[serde(default)]
    pub browse_url: Option<String>,
    #[serde(default = "default_incidence_type_field")]
    pub incidence_type_field: String,
    #[serde(default = "default_row_capacity")]
    pub row_capacity: usize,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub cooldown_ms: u64,
    #[serde(default)]
    pub tabs: TabNames,
    #[serde(default = "default_stamp_cell")]
    pub stamp_cell: String,
    #[serde(default)]
    pub spreadsheet: Option<SpreadsheetConfig>,
    #[serde(default)]
    pub version_check: Option<VersionCheck>,
}

impl ReportConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.shared_percentage > 0.0 && self.shared_percentage <= 1.0) {
            return Err(ReportError::Config(format!(
                "sharedPercentage must be in (0, 1], got {}",
                self.shared_percentage
            )));
        }
        if self.filter_id.trim().is_empty() {
            return Err(ReportError::Config("filterId must not be empty".into()));
        }
        if self.tracker_url.trim().is_empty() {
            return Err(ReportError::Config("trackerUrl must not be empty".into()));
        }
        if self.row_capacity == 0 {
            return Err(ReportError::Config("rowCapacity must be positive".into()));
        }
        if self.page_size == 0 || self.page_size > 1000 {
            return Err(ReportError::Config(format!(
                "pageSize must be between 1 and 1000, got {}",
                self.page_size
            )));
        }
        Ok(())
    }

    /// Base of the issue links written into the report.
    pub fn browse_base(&self) -> String {
        match &self.browse_url {
            Some(url) if !url.trim().is_empty() => url.trim_end_matches('/').to_string(),
            _ => format!("{}/browse", self.tracker_url.trim_end_matches('/')),
        }
    }

    pub fn issue_link(&self, issue_key: &str) -> String {
        format!("{}/{}", self.browse_base(), issue_key)
    }
}

/// Tracker login read from the credentials file.
#[derive(Deserialize, Clone)]
pub struct Credentials {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    /// Both fields must be present and non-empty.
    pub fn validate(&self) -> Result<(&str, &str)> {
        match (self.user_name.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                Ok((user, password))
            }
            _ => Err(ReportError::Config(format!(
                "{} must contain a non-empty user_name and password",
                CREDENTIALS_FILE
            ))),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_name", &self.user_name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Validated configuration and credentials of one run.
#[derive(Clone, Debug)]
pub struct Settings {
    pub report: ReportConfig,
    pub user_name: String,
    pub password: String,
}

impl Settings {
    pub fn new(report: ReportConfig, credentials: Credentials) -> Result<Self> {
        report.validate()?;
        let (user, password) = credentials.validate()?;
        Ok(Self {
            user_name: user.to_string(),
            password: password.to_string(),
            report,
        })
    }

    pub fn jira_config(&self) -> jira_api::JiraConfig {
        jira_api::JiraConfig::new(&self.report.tracker_url, &self.user_name, &self.password)
            .with_page_size(self.report.page_size)
            .with_cooldown(std::time::Duration::from_millis(self.report.cooldown_ms))
    }
}

/// Locates and loads the two JSON files of a run.
pub struct ConfigManager {
    dir: PathBuf,
}

impl ConfigManager {
    /// Uses the platform config directory, e.g. `~/.config/tracker-report`.
    pub fn new() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("org", "tracker-report", "tracker-report")
            .ok_or_else(|| ReportError::Config("could not determine config directory".into()))?;
        Ok(Self::with_dir(dirs.config_dir()))
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_report_config(&self) -> Result<ReportConfig> {
        read_json(&self.dir.join(CONFIG_FILE))
    }

    pub fn load_credentials(&self) -> Result<Credentials> {
        read_json(&self.dir.join(CREDENTIALS_FILE))
    }

    pub fn load_settings(&self) -> Result<Settings> {
        Settings::new(self.load_report_config()?, self.load_credentials()?)
    }
}

fn read_json<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = fs::read_to_string(path).map_err(|source| ReportError::ConfigFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ReportError::ConfigFormat {
        path: path.to_path_buf(),
        source,
    })
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text.trim().to_string()),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigManager, Credentials, ReportConfig, Settings, CONFIG_FILE, CREDENTIALS_FILE};
    use crate::error::ReportError;
    use std::env;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        env::temp_dir().join(format!("tracker-report-tests-{name}-{nanos}"))
    }

    fn minimal_config() -> ReportConfig {
        serde_json::from_str(r#"{"filterId": 123456, "trackerUrl": "https://jira.example.com/jira"}"#)
            .expect("minimal config should parse")
    }

    #[test]
    fn defaults_fill_optional_keys() {
        let config = minimal_config();
        assert_eq!(config.filter_id, "123456");
        assert_eq!(config.shared_percentage, 0.95);
        assert!(config.team.is_empty());
        assert_eq!(config.incidence_type_field, "customfield_15190");
        assert_eq!(config.row_capacity, 5000);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.tabs.detail, "JIRADATA");
        assert_eq!(config.tabs.index, "Índice");
        assert_eq!(config.stamp_cell, "E4");
        assert!(config.spreadsheet.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn issue_links_default_to_tracker_browse_page() {
        let config = minimal_config();
        assert_eq!(
            config.issue_link("PRJ-1"),
            "https://jira.example.com/jira/browse/PRJ-1"
        );

        let mut custom = minimal_config();
        custom.browse_url = Some("https://issues.example.com/view/".to_string());
        assert_eq!(custom.issue_link("PRJ-1"), "https://issues.example.com/view/PRJ-1");
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        let mut config = minimal_config();
        config.shared_percentage = 1.5;
        assert!(matches!(config.validate(), Err(ReportError::Config(_))));
        config.shared_percentage = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_credentials_are_fatal() {
        let creds: Credentials =
            serde_json::from_str(r#"{"user_name": "jdoe", "password": ""}"#).expect("parse");
        assert!(creds.validate().is_err());

        let missing: Credentials = serde_json::from_str("{}").expect("parse");
        assert!(Settings::new(minimal_config(), missing).is_err());
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds: Credentials =
            serde_json::from_str(r#"{"user_name": "jdoe", "password": "hunter2"}"#).expect("parse");
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }

    #[test]
    fn load_settings_reads_both_files() {
        let dir = unique_dir("settings");
        fs::create_dir_all(&dir).expect("create temp directory");
        fs::write(
            dir.join(CONFIG_FILE),
            r#"{"filterId": "42", "trackerUrl": "https://jira.example.com", "sharedPercentage": 0.8, "team": ["jdoe"]}"#,
        )
        .expect("write config");
        fs::write(
            dir.join(CREDENTIALS_FILE),
            r#"{"user_name": "jdoe", "password": "secret"}"#,
        )
        .expect("write credentials");

        let settings = ConfigManager::with_dir(&dir)
            .load_settings()
            .expect("settings should load");
        assert_eq!(settings.report.filter_id, "42");
        assert_eq!(settings.report.shared_percentage, 0.8);
        assert_eq!(settings.user_name, "jdoe");
        assert_eq!(settings.jira_config().page_size, 100);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_config_file_names_the_path() {
        let dir = unique_dir("missing");
        let err = ConfigManager::with_dir(&dir)
            .load_report_config()
            .expect_err("missing file must fail");
        assert!(matches!(err, ReportError::ConfigFile { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn invalid_json_is_a_format_error() {
        let dir = unique_dir("invalid");
        fs::create_dir_all(&dir).expect("create temp directory");
        fs::write(dir.join(CONFIG_FILE), "not-valid-json").expect("write invalid config");

        let err = ConfigManager::with_dir(&dir)
            .load_report_config()
            .expect_err("invalid json must fail");
        assert!(matches!(err, ReportError::ConfigFormat { .. }));

        let _ = fs::remove_dir_all(dir);
    }
}
