//! In-memory sink: keeps what would have been written and logs a summary.

use std::collections::BTreeMap;

use async_trait::async_trait;
use log::info;

use super::ReportSink;
use crate::error::Result;
use crate::report::Row;

#[derive(Debug, Default)]
pub struct DryRunSink {
    tabs: BTreeMap<String, Vec<Row>>,
    cells: BTreeMap<(String, String), String>,
    finished: bool,
}

impl DryRunSink {
    pub fn rows(&self, tab: &str) -> Option<&[Row]> {
        self.tabs.get(tab).map(Vec::as_slice)
    }

    /// Rows of `tab` that carry data, ignoring blank padding.
    pub fn data_rows(&self, tab: &str) -> usize {
        self.rows(tab)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row.iter().any(|cell| !cell.is_blank()))
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn cell(&self, tab: &str, cell: &str) -> Option<&str> {
        self.cells
            .get(&(tab.to_string(), cell.to_string()))
            .map(String::as_str)
    }

    pub fn finished(&self) -> bool {
        self.finished
    }
}

#[async_trait]
impl ReportSink for DryRunSink {
    async fn replace_rows(&mut self, tab: &str, rows: &[Row]) -> Result<()> {
        self.tabs.insert(tab.to_string(), rows.to_vec());
        Ok(())
    }

    async fn write_cell(&mut self, tab: &str, cell: &str, value: &str) -> Result<()> {
        self.cells
            .insert((tab.to_string(), cell.to_string()), value.to_string());
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        for tab in self.tabs.keys() {
            info!("dry run: {} would receive {} data rows", tab, self.data_rows(tab));
        }
        self.finished = true;
        Ok(())
    }
}
