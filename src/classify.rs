//! Per-issue flags derived from worklogs.

use std::collections::{HashMap, HashSet};

use crate::bridge::WorklogRecord;
use crate::config::ReportConfig;

/// Classification inputs, built once per run from the configuration.
#[derive(Clone, Debug)]
pub struct ClassifyConfig {
    pub shared_threshold: f64,
    pub team: HashSet<String>,
}

impl ClassifyConfig {
    pub fn new(shared_threshold: f64, team: impl IntoIterator<Item = String>) -> Self {
        Self {
            shared_threshold,
            team: team.into_iter().collect(),
        }
    }
}

impl From<&ReportConfig> for ClassifyConfig {
    fn from(config: &ReportConfig) -> Self {
        Self::new(config.shared_percentage, config.team.iter().cloned())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub is_shared: bool,
    pub is_team_exclusive: bool,
}

pub fn classify(
    worklogs: &[WorklogRecord],
    assignee: Option<&str>,
    config: &ClassifyConfig,
) -> Classification {
    Classification {
        is_shared: is_shared(worklogs, assignee, config.shared_threshold),
        is_team_exclusive: is_team_exclusive(worklogs, &config.team),
    }
}

/// True when the assignee logged strictly less than `threshold` of the total
/// time. Issues without logged time are never shared.
pub fn is_shared(worklogs: &[WorklogRecord], assignee: Option<&str>, threshold: f64) -> bool {
    let mut by_author: HashMap<&str, i64> = HashMap::new();
    for worklog in worklogs {
        *by_author.entry(worklog.author.as_str()).or_insert(0) += worklog.seconds;
    }

    let total: i64 = by_author.values().sum();
    if total <= 0 {
        return false;
    }

    let assignee_seconds = assignee
        .and_then(|name| by_author.get(name))
        .copied()
        .unwrap_or(0);
    (assignee_seconds as f64 / total as f64) < threshold
}

/// True when every worklog author is on the roster; vacuously true without worklogs.
pub fn is_team_exclusive(worklogs: &[WorklogRecord], roster: &HashSet<String>) -> bool {
    worklogs
        .iter()
        .all(|worklog| roster.contains(&worklog.author_username))
}
