//! User references embedded in issues and worklogs.

use serde::Deserialize;

/// Represents a Jira user as embedded in issue and worklog payloads (Server `name`/`key`, Cloud `accountId`).
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    pub name: Option<String>,
    pub key: Option<String>,
    pub account_id: Option<String>,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
}

impl JiraUser {
    /// Login-style identifier: `name`, then `key`, then `accountId`.
    pub fn username(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.key.as_deref())
            .or(self.account_id.as_deref())
    }

    /// Full name, falling back to the username.
    pub fn display(&self) -> Option<&str> {
        self.display_name.as_deref().or_else(|| self.username())
    }
}
