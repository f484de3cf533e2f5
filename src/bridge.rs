//! Report-facing records converted from the native Jira payloads.
//!
//! Everything downstream of the fetch stage works on these types; time
//! values stay in seconds and timestamps are parsed once here.

use chrono::{DateTime, FixedOffset};
use jira_api::{Issue as NativeIssue, Worklog as NativeWorklog};

use crate::config::ReportConfig;
use crate::format::{parse_jira_datetime, to_hours};

pub const UNASSIGNED_LABEL: &str = "Unassigned";

#[derive(Debug, Clone, PartialEq)]
pub struct ParentRecord {
    pub id: String,
    pub key: String,
    pub summary: String,
}

/// Aggregate time fields reported for issues with sub-tasks, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregateTimes {
    pub original_estimate: Option<i64>,
    pub remaining: Option<i64>,
    pub spent: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssueRecord {
    pub id: String,
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: Option<String>,
    pub project: String,
    pub issue_type: String,
    pub created: Option<DateTime<FixedOffset>>,
    pub updated: Option<DateTime<FixedOffset>>,
    pub resolved: Option<DateTime<FixedOffset>>,
    pub fix_version: Option<String>,
    pub parent: Option<ParentRecord>,
    pub original_estimate: Option<i64>,
    pub remaining: Option<i64>,
    pub spent: Option<i64>,
    pub aggregate: AggregateTimes,
    pub incidence_type: String,
    pub link: String,
}

impl IssueRecord {
    pub fn from_native(issue: &NativeIssue, config: &ReportConfig) -> Self {
        let fields = &issue.fields;
        Self {
            id: issue.id.clone(),
            key: issue.key.clone(),
            summary: fields.summary.clone().unwrap_or_default(),
            status: fields.status_name().unwrap_or_default().to_string(),
            assignee: fields
                .assignee
                .as_ref()
                .and_then(|user| user.display())
                .map(str::to_string),
            project: name_of(fields.project.as_ref()),
            issue_type: name_of(fields.issue_type.as_ref()),
            created: fields.created.as_deref().and_then(parse_jira_datetime),
            updated: fields.updated.as_deref().and_then(parse_jira_datetime),
            resolved: fields.resolution_date.as_deref().and_then(parse_jira_datetime),
            fix_version: fields.fix_version().map(str::to_string),
            parent: fields.parent.as_ref().map(|parent| ParentRecord {
                id: parent.id.clone(),
                key: parent.key.clone(),
                summary: parent.summary().unwrap_or_default().to_string(),
            }),
            original_estimate: fields.time_original_estimate,
            remaining: fields.time_estimate,
            spent: fields.time_spent,
            aggregate: AggregateTimes {
                original_estimate: fields.aggregate_time_original_estimate,
                remaining: fields.aggregate_time_estimate,
                spent: fields.aggregate_time_spent,
            },
            incidence_type: fields
                .select_value(&config.incidence_type_field)
                .unwrap_or_default(),
            link: config.issue_link(&issue.key),
        }
    }

    /// Issues without a parent are the top of their hierarchy.
    pub fn is_parent(&self) -> bool {
        self.parent.is_none()
    }

    pub fn assignee_label(&self) -> &str {
        self.assignee.as_deref().unwrap_or(UNASSIGNED_LABEL)
    }

    pub fn original_estimate_hours(&self) -> f64 {
        to_hours(self.original_estimate)
    }

    pub fn remaining_hours(&self) -> f64 {
        to_hours(self.remaining)
    }

    pub fn spent_hours(&self) -> f64 {
        to_hours(self.spent)
    }

    pub fn parent_key(&self) -> &str {
        self.parent.as_ref().map(|p| p.key.as_str()).unwrap_or_default()
    }

    pub fn parent_summary(&self) -> &str {
        self.parent
            .as_ref()
            .map(|p| p.summary.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorklogRecord {
    /// Display name, matched against the issue assignee.
    pub author: String,
    /// Login, matched against the team roster.
    pub author_username: String,
    pub seconds: i64,
    pub comment: String,
    pub started: Option<DateTime<FixedOffset>>,
}

impl WorklogRecord {
    pub fn from_native(worklog: &NativeWorklog) -> Self {
        let author = worklog.author.as_ref();
        Self {
            author: author
                .and_then(|user| user.display())
                .unwrap_or_default()
                .to_string(),
            author_username: author
                .and_then(|user| user.username())
                .unwrap_or_default()
                .to_string(),
            seconds: worklog.time_spent_seconds,
            comment: worklog.comment.clone().unwrap_or_default(),
            started: worklog.started.as_deref().and_then(parse_jira_datetime),
        }
    }

    pub fn hours(&self) -> f64 {
        to_hours(Some(self.seconds))
    }
}

fn name_of(reference: Option<&jira_api::NamedRef>) -> String {
    reference
        .and_then(|r| r.name.clone())
        .unwrap_or_default()
}
