//! Typed Jira REST API v2 client used by the report pipeline.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limiter;

pub use client::JiraClient;
pub use config::JiraConfig;
pub use error::{JiraError, Result};
pub use models::{
    Filter, Issue, IssueFields, JiraUser, NamedRef, ParentFields, ParentRef, SearchPage, Worklog,
    WorklogPage,
};
