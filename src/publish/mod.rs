//! Publish stage: writes the report tables into a spreadsheet target.

mod dry_run;
mod sheets;
mod workbook;

pub use dry_run::DryRunSink;
pub use sheets::{SheetsSink, DEFAULT_SHEETS_API};
pub use workbook::{parse_cell_ref, WorkbookSink};

use async_trait::async_trait;
use log::{info, warn};

use crate::config::TabNames;
use crate::error::Result;
use crate::report::{Cell, ReportTables, Row};

/// A spreadsheet-like destination for the report.
#[async_trait]
pub trait ReportSink: Send {
    /// Runs before anything is fetched; may veto the run.
    async fn preflight(&mut self) -> Result<()> {
        Ok(())
    }

    /// Clears every row of `tab` below the header and writes `rows` from row 2.
    async fn replace_rows(&mut self, tab: &str, rows: &[Row]) -> Result<()>;

    /// Writes a single A1-addressed cell.
    async fn write_cell(&mut self, tab: &str, cell: &str, value: &str) -> Result<()>;

    async fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Where and how much to write.
pub struct PublishPlan<'a> {
    pub tabs: &'a TabNames,
    pub capacity: usize,
    pub stamp_cell: &'a str,
    pub stamp: String,
}

/// Pads `rows` with blank rows up to `capacity` so leftovers of a previous,
/// longer run are overwritten. Returns false when the rows already exceed it.
pub fn pad_rows(rows: &mut Vec<Row>, capacity: usize) -> bool {
    let fits = rows.len() <= capacity;
    while rows.len() < capacity {
        rows.push(vec![Cell::blank()]);
    }
    fits
}

pub async fn publish(
    sink: &mut dyn ReportSink,
    tables: &ReportTables,
    plan: &PublishPlan<'_>,
) -> Result<()> {
    let targets = [
        (plan.tabs.detail.as_str(), &tables.detail),
        (plan.tabs.summary.as_str(), &tables.summary),
        (plan.tabs.errors.as_str(), &tables.errors),
    ];

    for (tab, rows) in targets {
        let mut padded = rows.clone();
        if !pad_rows(&mut padded, plan.capacity) {
            warn!(
                "{} has {} rows, more than the expected maximum of {}; raise rowCapacity and the sheet ranges that read it",
                tab,
                rows.len(),
                plan.capacity
            );
        }
        sink.replace_rows(tab, &padded).await?;
        info!("{} updated ({} rows)", tab, rows.len());
    }

    sink.write_cell(&plan.tabs.index, plan.stamp_cell, &plan.stamp)
        .await?;
    sink.finish().await
}
