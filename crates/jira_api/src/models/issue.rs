//! Issue payloads returned by the search endpoint.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use super::de::{optional_string_or_number, string_or_number};
use super::JiraUser;

#[derive(Debug, Deserialize, Clone)]
pub struct Issue {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub key: String,
    pub fields: IssueFields,
}

/// Issue fields used by the report. Time values are seconds; anything not
/// modelled (custom fields in particular) lands in `extra`.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct IssueFields {
    pub summary: Option<String>,
    pub status: Option<NamedRef>,
    pub assignee: Option<JiraUser>,
    pub project: Option<NamedRef>,
    #[serde(rename = "issuetype")]
    pub issue_type: Option<NamedRef>,
    pub created: Option<String>,
    pub updated: Option<String>,
    #[serde(rename = "resolutiondate")]
    pub resolution_date: Option<String>,
    #[serde(rename = "fixVersions")]
    pub fix_versions: Vec<NamedRef>,
    pub parent: Option<ParentRef>,
    #[serde(rename = "timeoriginalestimate")]
    pub time_original_estimate: Option<i64>,
    #[serde(rename = "timeestimate")]
    pub time_estimate: Option<i64>,
    #[serde(rename = "timespent")]
    pub time_spent: Option<i64>,
    #[serde(rename = "aggregatetimeoriginalestimate")]
    pub aggregate_time_original_estimate: Option<i64>,
    #[serde(rename = "aggregatetimeestimate")]
    pub aggregate_time_estimate: Option<i64>,
    #[serde(rename = "aggregatetimespent")]
    pub aggregate_time_spent: Option<i64>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Any `{ "id", "name" }` shaped reference: status, project, issue type, version.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct NamedRef {
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ParentRef {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub fields: Option<ParentFields>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ParentFields {
    pub summary: Option<String>,
}

impl IssueFields {
    pub fn status_name(&self) -> Option<&str> {
        self.status.as_ref().and_then(|status| status.name.as_deref())
    }

    /// Name of the first fix version, which is what the report tracks.
    pub fn fix_version(&self) -> Option<&str> {
        self.fix_versions
            .first()
            .and_then(|version| version.name.as_deref())
            .filter(|name| !name.is_empty())
    }

    /// Value of a single-select custom field (`{"value": "..."}`), or a plain string.
    pub fn select_value(&self, field: &str) -> Option<String> {
        match self.extra.get(field)? {
            Value::Object(map) => map
                .get("value")
                .and_then(Value::as_str)
                .map(str::to_string),
            Value::String(text) => Some(text.clone()),
            _ => None,
        }
    }
}

impl ParentRef {
    pub fn summary(&self) -> Option<&str> {
        self.fields.as_ref().and_then(|fields| fields.summary.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::Issue;

    const PAYLOAD: &str = r#"{
        "id": "10001",
        "key": "PRJ-2",
        "fields": {
            "summary": "NP_ Export button",
            "status": {"id": "3", "name": "In progress"},
            "assignee": {"name": "jdoe", "displayName": "Jane Doe"},
            "project": {"id": 10, "name": "Project"},
            "issuetype": {"name": "Sub-task"},
            "created": "2019-04-01T19:59:00.000+0200",
            "updated": "2019-04-02T08:00:00.000+0200",
            "resolutiondate": null,
            "fixVersions": [{"id": "20", "name": "1.2"}, {"name": "1.3"}],
            "parent": {"id": 10000, "key": "PRJ-1", "fields": {"summary": "Epic"}},
            "timeoriginalestimate": 7200,
            "timeestimate": null,
            "timespent": 3600,
            "customfield_15190": {"value": "Bug"},
            "customfield_99999": "plain"
        }
    }"#;

    #[test]
    fn decodes_issue_with_custom_fields() {
        let issue: Issue = serde_json::from_str(PAYLOAD).expect("issue should decode");
        assert_eq!(issue.id, "10001");
        assert_eq!(issue.fields.status_name(), Some("In progress"));
        assert_eq!(issue.fields.fix_version(), Some("1.2"));
        assert_eq!(issue.fields.time_original_estimate, Some(7200));
        assert_eq!(issue.fields.time_estimate, None);
        assert_eq!(issue.fields.select_value("customfield_15190").as_deref(), Some("Bug"));
        assert_eq!(issue.fields.select_value("customfield_99999").as_deref(), Some("plain"));
        assert_eq!(issue.fields.select_value("customfield_0"), None);

        let parent = issue.fields.parent.expect("parent present");
        assert_eq!(parent.id, "10000");
        assert_eq!(parent.summary(), Some("Epic"));
    }

    #[test]
    fn missing_fields_decode_as_empty() {
        let issue: Issue =
            serde_json::from_str(r#"{"id": 1, "key": "PRJ-1", "fields": {"fixVersions": []}}"#)
                .expect("issue should decode");
        assert!(issue.fields.summary.is_none());
        assert!(issue.fields.fix_version().is_none());
        assert!(issue.fields.parent.is_none());
    }
}
