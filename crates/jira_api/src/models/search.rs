use serde::Deserialize;

use super::Issue;

/// One page of `search` results. An empty object decodes as a page with total 0.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchPage {
    pub start_at: u64,
    pub max_results: u64,
    pub total: u64,
    pub issues: Vec<Issue>,
}
