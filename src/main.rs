//! tracker-report CLI: loads the run configuration and publishes the report.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use tracker_report::config::ConfigManager;
use tracker_report::format::today;
use tracker_report::publish::{DryRunSink, ReportSink, SheetsSink, WorkbookSink};
use tracker_report::RunOutcome;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SinkKind {
    /// Google Sheets document named in config.json
    Sheets,
    /// Local .xlsx workbook
    Xlsx,
    /// Build the report without writing it
    DryRun,
}

#[derive(Parser)]
#[command(name = "tracker-report")]
#[command(author, version, about = "Publish Jira worklog and audit reports to a spreadsheet", long_about = None)]
struct Cli {
    /// Directory holding config.json and jira_credentials.json
    #[arg(long, env = "TRACKER_REPORT_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Where the report is written
    #[arg(long, value_enum, default_value = "sheets")]
    sink: SinkKind,

    /// Output path for the xlsx sink
    #[arg(long, default_value = "report.xlsx")]
    output: PathBuf,

    /// OAuth access token for the Sheets API (overrides config.json)
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // .env values are handy during development; a missing file is fine.
    let _ = dotenvy::dotenv();

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();

    let cli = Cli::parse();
    info!("starting tracker-report {}", env!("CARGO_PKG_VERSION"));

    let manager = match &cli.config_dir {
        Some(dir) => ConfigManager::with_dir(dir),
        None => ConfigManager::new()?,
    };
    let settings = manager
        .load_settings()
        .with_context(|| format!("loading configuration from {}", manager.dir().display()))?;

    let mut sink: Box<dyn ReportSink> = match cli.sink {
        SinkKind::Sheets => {
            let Some(spreadsheet) = settings.report.spreadsheet.clone() else {
                bail!("config.json has no spreadsheet section; use --sink xlsx or --sink dry-run");
            };
            let Some(token) = cli.access_token.clone().or(spreadsheet.access_token) else {
                bail!("no Sheets access token; pass --access-token or set GOOGLE_ACCESS_TOKEN");
            };
            let mut sink = SheetsSink::new(spreadsheet.spreadsheet_id, &token)?;
            if let Some(check) = settings.report.version_check.clone() {
                sink = sink.with_version_check(settings.report.tabs.index.clone(), check);
            }
            Box::new(sink)
        }
        SinkKind::Xlsx => Box::new(WorkbookSink::new(&cli.output)),
        SinkKind::DryRun => Box::new(DryRunSink::default()),
    };

    match tracker_report::run(&settings, sink.as_mut(), today()).await? {
        RunOutcome::Published {
            issues,
            worklog_rows,
            violations,
        } => info!(
            "finished: {} issues, {} worklog rows, {} rule violations",
            issues, worklog_rows, violations
        ),
        RunOutcome::NoIssues => info!("nothing to publish"),
    }
    Ok(())
}
