use serde::Deserialize;

use super::de::string_or_number;

/// A saved Jira filter; `search_url` is the ready-made search endpoint for its JQL.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: Option<String>,
    pub jql: Option<String>,
    pub search_url: Option<String>,
}
