//! Local `.xlsx` target, written in one go when the run finishes.

use std::path::PathBuf;

use async_trait::async_trait;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_xlsxwriter::{Format, Workbook};

use super::ReportSink;
use crate::error::{ReportError, Result};
use crate::report::{Cell, Row};

static CELL_REF_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$?([A-Za-z]{1,3})\$?([1-9][0-9]*)$").expect("invalid cell ref regex"));

/// Converts an A1 reference into zero-based `(row, column)`.
pub fn parse_cell_ref(reference: &str) -> Option<(u32, u16)> {
    let captures = CELL_REF_REGEX.captures(reference.trim())?;
    let column = captures[1]
        .chars()
        .try_fold(0u32, |acc, letter| {
            let digit = letter.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
            acc.checked_mul(26)?.checked_add(digit)
        })?
        .checked_sub(1)?;
    let row = captures[2].parse::<u32>().ok()?.checked_sub(1)?;
    Some((row, u16::try_from(column).ok()?))
}

struct PendingSheet {
    name: String,
    rows: Vec<Row>,
    cells: Vec<(u32, u16, String)>,
}

/// Buffers tabs in call order and saves the workbook on `finish`. Row 1 of
/// every data tab is left for headers.
pub struct WorkbookSink {
    path: PathBuf,
    sheets: Vec<PendingSheet>,
}

impl WorkbookSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheets: Vec::new(),
        }
    }

    fn sheet_mut(&mut self, name: &str) -> &mut PendingSheet {
        if let Some(index) = self.sheets.iter().position(|sheet| sheet.name == name) {
            return &mut self.sheets[index];
        }
        self.sheets.push(PendingSheet {
            name: name.to_string(),
            rows: Vec::new(),
            cells: Vec::new(),
        });
        let last = self.sheets.len() - 1;
        &mut self.sheets[last]
    }
}

#[async_trait]
impl ReportSink for WorkbookSink {
    async fn replace_rows(&mut self, tab: &str, rows: &[Row]) -> Result<()> {
        self.sheet_mut(tab).rows = rows.to_vec();
        Ok(())
    }

    async fn write_cell(&mut self, tab: &str, cell: &str, value: &str) -> Result<()> {
        let (row, column) = parse_cell_ref(cell)
            .ok_or_else(|| ReportError::Config(format!("invalid cell reference {:?}", cell)))?;
        self.sheet_mut(tab).cells.push((row, column, value.to_string()));
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        let mut workbook = Workbook::new();
        let hours = Format::new().set_num_format("0.00");

        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;

            for (offset, row) in sheet.rows.iter().enumerate() {
                let row_index = u32::try_from(offset + 1)
                    .map_err(|_| ReportError::Publish(format!("{} has too many rows", sheet.name)))?;
                for (column, cell) in row.iter().enumerate() {
                    let column = u16::try_from(column)
                        .map_err(|_| ReportError::Publish(format!("{} has too many columns", sheet.name)))?;
                    match cell {
                        Cell::Text(text) if text.is_empty() => {}
                        Cell::Text(text) => {
                            worksheet.write_string(row_index, column, text)?;
                        }
                        Cell::Number(value) => {
                            worksheet.write_number_with_format(row_index, column, *value, &hours)?;
                        }
                    }
                }
            }

            for (row, column, value) in &sheet.cells {
                worksheet.write_string(*row, *column, value)?;
            }
        }

        workbook.save(&self.path)?;
        info!("workbook saved to {}", self.path.display());
        Ok(())
    }
}
