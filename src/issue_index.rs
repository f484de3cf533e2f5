//! Lookup of fetched issues by id, used to compare children with parents.

use std::collections::HashMap;

use crate::bridge::IssueRecord;

/// Fix versions of every fetched issue keyed by issue id. Parents outside the
/// fetched set are simply unknown.
#[derive(Clone, Debug, Default)]
pub struct IssueIndex {
    fix_versions: HashMap<String, Option<String>>,
}

impl IssueIndex {
    pub fn from_issues(issues: &[IssueRecord]) -> Self {
        let fix_versions = issues
            .iter()
            .map(|issue| (issue.id.clone(), issue.fix_version.clone()))
            .collect();
        Self { fix_versions }
    }

    /// Fix version of a fetched issue; `None` when unknown or unset.
    pub fn fix_version(&self, issue_id: &str) -> Option<&str> {
        self.fix_versions
            .get(issue_id)
            .and_then(|version| version.as_deref())
    }
}
