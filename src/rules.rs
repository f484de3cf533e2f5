//! Audit rules evaluated per issue and the error report they produce.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::bridge::IssueRecord;
use crate::format::format_day;
use crate::issue_index::IssueIndex;
use crate::report::Row;
use crate::row;

pub const OPEN_STATES: [&str; 5] = ["Open", "In progress", "Reopened", "Paused", "Blocked"];
/// `Rejected` is deliberately absent: rejected issues may be in any state.
pub const CLOSED_STATES: [&str; 2] = ["Resolved", "Closed"];
pub const STALE_AFTER_DAYS: i64 = 30;
pub const SCOPE_CHANGE_PREFIXES: [&str; 2] = ["NP_", "NP-"];

/// Rule categories, in the order they appear in the error report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rule {
    VersionMismatch,
    OpenWithoutRemaining,
    OpenStale,
    ClosedWithRemaining,
    ClosedWithoutSpent,
    Deviated,
    ScopeChangeUnestimated,
    ParentWithSpent,
}

impl Rule {
    pub const ALL: [Rule; 8] = [
        Rule::VersionMismatch,
        Rule::OpenWithoutRemaining,
        Rule::OpenStale,
        Rule::ClosedWithRemaining,
        Rule::ClosedWithoutSpent,
        Rule::Deviated,
        Rule::ScopeChangeUnestimated,
        Rule::ParentWithSpent,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Rule::VersionMismatch => "** Issues with a different fix version than their parent.",
            Rule::OpenWithoutRemaining => "** Open issues without remaining estimate.",
            Rule::OpenStale => "** Open issues last updated more than a month ago.",
            Rule::ClosedWithRemaining => "** Closed issues with remaining estimate.",
            Rule::ClosedWithoutSpent => "** Closed issues with zero time spent.",
            Rule::Deviated => "** Deviated issues (estimate < spent + remaining).",
            Rule::ScopeChangeUnestimated => "** Scope changes without original estimate.",
            Rule::ParentWithSpent => "** Parent issues with time spent.",
        }
    }

    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Rule::VersionMismatch => &["Issue", "Parent", "Summary", "Parent summary", "Assignee", "Link"],
            Rule::OpenStale => &["Issue", "Summary", "Assignee", "Last update", "Link"],
            _ => &["Issue", "Summary", "Assignee", "Link"],
        }
    }
}

/// Violation rows grouped by rule.
#[derive(Clone, Debug, Default)]
pub struct Violations {
    by_rule: BTreeMap<Rule, Vec<Row>>,
}

impl Violations {
    pub fn record(&mut self, rule: Rule, row: Row) {
        self.by_rule.entry(rule).or_default().push(row);
    }

    pub fn rows(&self, rule: Rule) -> &[Row] {
        self.by_rule.get(&rule).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.by_rule.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Title, header and violation rows of every non-empty category.
    pub fn report_rows(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        for rule in Rule::ALL {
            let violations = self.rows(rule);
            if violations.is_empty() {
                continue;
            }
            rows.push(row![rule.title()]);
            rows.push(rule.headers().iter().map(|header| (*header).into()).collect());
            rows.extend(violations.iter().cloned());
        }
        rows
    }
}

/// Run-wide inputs of the rules.
pub struct RuleContext<'a> {
    pub index: &'a IssueIndex,
    pub today: NaiveDate,
}

pub fn is_open(status: &str) -> bool {
    OPEN_STATES.contains(&status)
}

pub fn is_closed(status: &str) -> bool {
    CLOSED_STATES.contains(&status)
}

pub fn is_scope_change(summary: &str) -> bool {
    let summary = summary.trim();
    SCOPE_CHANGE_PREFIXES
        .iter()
        .any(|prefix| summary.starts_with(prefix))
}

/// Applies every rule to one issue. Rules are independent: an issue may land
/// in several categories.
pub fn evaluate(issue: &IssueRecord, context: &RuleContext<'_>, out: &mut Violations) {
    if issue.is_parent() {
        evaluate_parent(issue, out);
    } else if let Some(parent) = &issue.parent {
        let parent_version = context.index.fix_version(&parent.id);
        if let (Some(parent_version), Some(own)) = (parent_version, issue.fix_version.as_deref()) {
            if parent_version != own {
                out.record(
                    Rule::VersionMismatch,
                    row![
                        issue.key.as_str(),
                        parent.key.as_str(),
                        issue.summary.as_str(),
                        parent.summary.as_str(),
                        issue.assignee_label(),
                        issue.link.as_str(),
                    ],
                );
            }
        }
        evaluate_child(issue, context, out);
    }

    if is_scope_change(&issue.summary) && issue.original_estimate_hours() == 0.0 {
        out.record(Rule::ScopeChangeUnestimated, basic_row(issue));
    }
}

fn evaluate_child(issue: &IssueRecord, context: &RuleContext<'_>, out: &mut Violations) {
    let remaining = issue.remaining_hours();
    let spent = issue.spent_hours();

    if is_open(&issue.status) {
        if remaining <= 0.0 {
            out.record(Rule::OpenWithoutRemaining, basic_row(issue));
        }
        if let Some(updated) = issue.updated {
            let idle_days = (context.today - updated.date_naive()).num_days();
            if idle_days > STALE_AFTER_DAYS {
                out.record(
                    Rule::OpenStale,
                    row![
                        issue.key.as_str(),
                        issue.summary.as_str(),
                        issue.assignee_label(),
                        format_day(Some(&updated)),
                        issue.link.as_str(),
                    ],
                );
            }
        }
    }

    if is_closed(&issue.status) {
        if remaining > 0.0 {
            out.record(Rule::ClosedWithRemaining, basic_row(issue));
        }
        if spent == 0.0 {
            out.record(Rule::ClosedWithoutSpent, basic_row(issue));
        }
    }

    // Whole hours only, so sub-hour noise does not count as deviation.
    let estimate = issue.original_estimate_hours().trunc();
    if estimate < spent.trunc() + remaining.trunc() {
        out.record(Rule::Deviated, basic_row(issue));
    }
}

fn evaluate_parent(issue: &IssueRecord, out: &mut Violations) {
    let aggregate = issue.aggregate;
    let present = |value: Option<i64>| value.filter(|seconds| *seconds != 0);
    if let (Some(estimate), Some(remaining), Some(spent)) = (
        present(aggregate.original_estimate),
        present(aggregate.remaining),
        present(aggregate.spent),
    ) {
        if estimate < spent.saturating_add(remaining) {
            out.record(Rule::Deviated, basic_row(issue));
        }
    }

    if issue.spent_hours() > 0.0 {
        out.record(Rule::ParentWithSpent, basic_row(issue));
    }
}

fn basic_row(issue: &IssueRecord) -> Row {
    row![
        issue.key.as_str(),
        issue.summary.as_str(),
        issue.assignee_label(),
        issue.link.as_str(),
    ]
}
