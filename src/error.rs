//! Error model of the report pipeline.

use std::io;
use std::path::PathBuf;

use jira_api::JiraError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("cannot read {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    ConfigFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("tracker error: {0}")]
    Tracker(#[from] JiraError),
    #[error("spreadsheet error: {0}")]
    Publish(String),
    #[error("report version {version:?} is not accepted, the spreadsheet requires {required:?}")]
    VersionMismatch { version: String, required: String },
    #[error("workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

impl From<reqwest::Error> for ReportError {
    fn from(err: reqwest::Error) -> Self {
        ReportError::Publish(err.to_string())
    }
}
