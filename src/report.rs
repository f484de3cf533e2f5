//! Report tables: typed cells, row layouts and the per-run builder.

use chrono::NaiveDate;
use log::info;
use serde::Serialize;

use crate::bridge::{IssueRecord, WorklogRecord};
use crate::classify::{classify, Classification, ClassifyConfig};
use crate::format::{format_day, format_month, yes_no};
use crate::issue_index::IssueIndex;
use crate::rules::{evaluate, RuleContext, Violations};

const PROGRESS_EVERY: usize = 100;

/// A spreadsheet value. Serialises as a bare JSON string or number so numbers
/// stay numeric under "user entered" input.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn blank() -> Self {
        Cell::Text(String::new())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Text(text) if text.is_empty())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            Cell::Number(_) => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

pub type Row = Vec<Cell>;

/// Builds a row from heterogeneous values.
#[macro_export]
macro_rules! row {
    ($($value:expr),* $(,)?) => {
        vec![$($crate::report::Cell::from($value)),*]
    };
}

/// The three record sets of one run.
#[derive(Clone, Debug, Default)]
pub struct ReportTables {
    pub detail: Vec<Row>,
    pub summary: Vec<Row>,
    pub errors: Vec<Row>,
    pub violations: Violations,
}

/// One row per worklog, each repeating the issue columns.
pub fn detail_rows(
    issue: &IssueRecord,
    worklogs: &[WorklogRecord],
    flags: Classification,
) -> Vec<Row> {
    worklogs
        .iter()
        .map(|worklog| {
            row![
                issue.project.as_str(),
                issue.issue_type.as_str(),
                issue.key.as_str(),
                issue.summary.as_str(),
                issue.original_estimate_hours(),
                issue.remaining_hours(),
                issue.spent_hours(),
                format_day(worklog.started.as_ref()),
                worklog.author.as_str(),
                worklog.hours(),
                worklog.comment.as_str(),
                yes_no(flags.is_shared),
                yes_no(flags.is_team_exclusive),
            ]
        })
        .collect()
}

pub fn summary_row(issue: &IssueRecord, flags: Classification) -> Row {
    row![
        issue.key.as_str(),
        issue.summary.as_str(),
        issue.assignee_label(),
        issue.original_estimate_hours(),
        issue.remaining_hours(),
        issue.spent_hours(),
        issue.fix_version.clone().unwrap_or_default(),
        issue.status.as_str(),
        format_day(issue.created.as_ref()),
        format_day(issue.updated.as_ref()),
        format_day(issue.resolved.as_ref()),
        format_month(issue.resolved.as_ref()),
        issue.incidence_type.as_str(),
        issue.parent_summary(),
        issue.link.as_str(),
        yes_no(flags.is_shared),
        yes_no(flags.is_team_exclusive),
    ]
}

/// Accumulates the report one issue at a time.
pub struct ReportBuilder {
    classify: ClassifyConfig,
    index: IssueIndex,
    today: NaiveDate,
    detail: Vec<Row>,
    summary: Vec<Row>,
    violations: Violations,
    analysed: usize,
}

impl ReportBuilder {
    /// `issues` is the full fetched set, needed up front to resolve parents.
    pub fn new(issues: &[IssueRecord], classify: ClassifyConfig, today: NaiveDate) -> Self {
        Self {
            classify,
            index: IssueIndex::from_issues(issues),
            today,
            detail: Vec::new(),
            summary: Vec::new(),
            violations: Violations::default(),
            analysed: 0,
        }
    }

    pub fn add_issue(&mut self, issue: &IssueRecord, worklogs: &[WorklogRecord]) -> Classification {
        let flags = classify(worklogs, issue.assignee.as_deref(), &self.classify);

        let context = RuleContext {
            index: &self.index,
            today: self.today,
        };
        evaluate(issue, &context, &mut self.violations);

        self.detail.extend(detail_rows(issue, worklogs, flags));
        self.summary.push(summary_row(issue, flags));

        self.analysed += 1;
        if self.analysed % PROGRESS_EVERY == 0 {
            info!("{} issues analysed", self.analysed);
        }
        flags
    }

    pub fn finish(self) -> ReportTables {
        info!(
            "report built: {} issues, {} worklog rows, {} violations",
            self.summary.len(),
            self.detail.len(),
            self.violations.total()
        );
        ReportTables {
            errors: self.violations.report_rows(),
            detail: self.detail,
            summary: self.summary,
            violations: self.violations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{detail_rows, summary_row, Cell, ReportBuilder};
    use crate::bridge::fixtures::{child_of, issue, worklog};
    use crate::classify::{Classification, ClassifyConfig};
    use crate::rules::Rule;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 4, 20).expect("valid date")
    }

    #[test]
    fn cells_serialise_as_plain_json_values() {
        let row = row!["PRJ-1", 1.5];
        assert_eq!(serde_json::to_string(&row).expect("serialise"), r#"["PRJ-1",1.5]"#);
        assert!(Cell::blank().is_blank());
        assert_eq!(Cell::from("x").as_text(), Some("x"));
    }

    #[test]
    fn detail_has_one_row_per_worklog() {
        let record = issue("PRJ-1");
        let mut log = worklog("Jane Doe", "jdoe", 5400);
        log.comment = "pairing".to_string();
        let rows = detail_rows(
            &record,
            &[log, worklog("Rick Roe", "rroe", 1800)],
            Classification {
                is_shared: true,
                is_team_exclusive: false,
            },
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 13);
        assert_eq!(rows[0][2], Cell::from("PRJ-1"));
        assert_eq!(rows[0][4], Cell::Number(2.0));
        assert_eq!(rows[0][7], Cell::from("02/04/2019"));
        assert_eq!(rows[0][9], Cell::Number(1.5));
        assert_eq!(rows[0][10], Cell::from("pairing"));
        assert_eq!(rows[0][11], Cell::from("Yes"));
        assert_eq!(rows[1][12], Cell::from("No"));
    }

    #[test]
    fn summary_row_layout() {
        let parent = issue("PRJ-1");
        let mut record = child_of("PRJ-2", &parent);
        record.assignee = None;
        record.incidence_type = "Production".to_string();
        let row = summary_row(&record, Classification::default());

        assert_eq!(row.len(), 17);
        assert_eq!(row[2], Cell::from("Unassigned"));
        assert_eq!(row[6], Cell::from("1.0"));
        assert_eq!(row[8], Cell::from("01/04/2019"));
        assert_eq!(row[10], Cell::blank());
        assert_eq!(row[11], Cell::blank());
        assert_eq!(row[12], Cell::from("Production"));
        assert_eq!(row[13], Cell::from("Summary of PRJ-1"));
        assert_eq!(row[14], Cell::from("https://jira.example.com/browse/PRJ-2"));
    }

    #[test]
    fn builder_collects_tables_and_violations() {
        let parent = issue("PRJ-1");
        let mut child = child_of("PRJ-2", &parent);
        child.fix_version = Some("2.0".to_string());
        let issues = vec![parent.clone(), child.clone()];

        let mut builder =
            ReportBuilder::new(&issues, ClassifyConfig::new(0.95, vec!["jdoe".to_string()]), today());
        builder.add_issue(&parent, &[]);
        let flags = builder.add_issue(
            &child,
            &[worklog("Jane Doe", "jdoe", 3600), worklog("Rick Roe", "rroe", 3600)],
        );
        assert!(flags.is_shared);
        assert!(!flags.is_team_exclusive);

        let tables = builder.finish();
        assert_eq!(tables.summary.len(), 2);
        assert_eq!(tables.detail.len(), 2);
        assert_eq!(tables.violations.rows(Rule::VersionMismatch).len(), 1);
        assert_eq!(tables.violations.rows(Rule::ParentWithSpent).len(), 1);
        assert!(!tables.errors.is_empty());
    }
}
