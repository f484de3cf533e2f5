//! Jira worklog report: fetch issues of a saved filter, classify and audit
//! them, and publish detail, summary and error tables to a spreadsheet.

pub mod bridge;
pub mod classify;
pub mod config;
pub mod error;
pub mod format;
pub mod issue_index;
pub mod publish;
pub mod report;
pub mod rules;

use chrono::NaiveDate;
use log::{error, info};

use bridge::{IssueRecord, WorklogRecord};
use classify::ClassifyConfig;
use config::Settings;
use jira_api::{JiraClient, JiraError};
use publish::{publish, PublishPlan, ReportSink};
use report::ReportBuilder;

pub use error::{ReportError, Result};

/// What a run ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Published {
        issues: usize,
        worklog_rows: usize,
        violations: usize,
    },
    /// The tracker returned nothing to report on, or refused the filter.
    NoIssues,
}

/// Runs the whole pipeline against the tracker configured in `settings`.
pub async fn run(settings: &Settings, sink: &mut dyn ReportSink, today: NaiveDate) -> Result<RunOutcome> {
    let client = JiraClient::new(settings.jira_config())?;
    run_with_client(&client, settings, sink, today).await
}

pub async fn run_with_client(
    client: &JiraClient,
    settings: &Settings,
    sink: &mut dyn ReportSink,
    today: NaiveDate,
) -> Result<RunOutcome> {
    sink.preflight().await?;

    let filter_id = settings.report.filter_id.as_str();
    info!("loading issues of filter {}", filter_id);
    let issues = match client.search_filter(filter_id).await {
        Ok(issues) => issues,
        Err(err) if err.is_rejection() => {
            log_rejected_filter(filter_id, &err);
            return Ok(RunOutcome::NoIssues);
        }
        Err(err) => return Err(err.into()),
    };
    if issues.is_empty() {
        info!("filter {} matched no issues", filter_id);
        return Ok(RunOutcome::NoIssues);
    }

    let records: Vec<IssueRecord> = issues
        .iter()
        .map(|issue| IssueRecord::from_native(issue, &settings.report))
        .collect();

    info!("analysing {} issues", records.len());
    let mut builder = ReportBuilder::new(&records, ClassifyConfig::from(&settings.report), today);
    for record in &records {
        let worklogs: Vec<WorklogRecord> = client
            .get_issue_worklogs(&record.id)
            .await?
            .iter()
            .map(WorklogRecord::from_native)
            .collect();
        builder.add_issue(record, &worklogs);
    }
    let tables = builder.finish();

    let plan = PublishPlan {
        tabs: &settings.report.tabs,
        capacity: settings.report.row_capacity,
        stamp_cell: &settings.report.stamp_cell,
        stamp: format::run_stamp(today, &settings.user_name),
    };
    publish(sink, &tables, &plan).await?;

    info!(
        "finished after {} tracker requests",
        client.rate_limiter().issued()
    );
    Ok(RunOutcome::Published {
        issues: tables.summary.len(),
        worklog_rows: tables.detail.len(),
        violations: tables.violations.total(),
    })
}

fn log_rejected_filter(filter_id: &str, err: &JiraError) {
    error!("tracker refused the request: {}", err);
    error!(
        "the filter {} may be broken or misconfigured, the credentials may be wrong, or the user has no access to it",
        filter_id
    );
}
