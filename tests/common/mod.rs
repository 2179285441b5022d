#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use panel_tools::io::WorkbookSource;
use panel_tools::model::{Cell, Row, Sheet, Workbook};
use panel_tools::{Result, ToolError};

pub const REQUEST_SHEET: &str = "REQUEST_TABLE";

/// A request sheet with `series` written from E7 downwards, one per period.
pub fn request_table(series: &[&str]) -> Sheet {
    let mut sheet = Sheet::new(REQUEST_SHEET);
    *sheet.cell_mut(0, 0) = Cell::from("Request");
    for (offset, token) in series.iter().enumerate() {
        *sheet.cell_mut(6 + offset, 4) = Cell::from(*token);
    }
    sheet
}

/// A request sheet carrying the right series for `entity` over `periods`.
pub fn request_for(entity: u32, periods: usize) -> Sheet {
    let token = format!("FDEALL{entity}");
    let series: Vec<&str> = vec![token.as_str(); periods];
    request_table(&series)
}

/// A data sheet with a `DSCD,Value` header and one row per label.
pub fn data_sheet(name: &str, labels: &[&str]) -> Sheet {
    let mut rows: Vec<Row> = vec![vec![Cell::from("DSCD"), Cell::from("Value")]];
    for (idx, label) in labels.iter().enumerate() {
        rows.push(vec![Cell::from(*label), Cell::Number(idx as f64 + 1.0)]);
    }
    Sheet::with_rows(name, rows)
}

/// Data sheets first, request sheet last.
pub fn entity_workbook(entity: u32, sheets: &[(&str, &[&str])]) -> Workbook {
    let mut workbook = Workbook::new();
    for (name, labels) in sheets {
        workbook.push_sheet(data_sheet(name, labels));
    }
    workbook.push_sheet(request_for(entity, sheets.len()));
    workbook
}

/// First-column labels of every data row of `sheet`.
pub fn labels(workbook: &Workbook, sheet: &str) -> Vec<String> {
    workbook
        .sheet(sheet)
        .expect("sheet present")
        .data_rows()
        .iter()
        .map(|row| row[0].to_string())
        .collect()
}

/// Workbooks held in memory, keyed by path.
#[derive(Default)]
pub struct MemorySource {
    pub workbooks: HashMap<PathBuf, Workbook>,
}

impl MemorySource {
    pub fn insert(&mut self, path: impl Into<PathBuf>, workbook: Workbook) {
        self.workbooks.insert(path.into(), workbook);
    }
}

impl WorkbookSource for MemorySource {
    fn load(&self, path: &Path) -> Result<Workbook> {
        self.workbooks
            .get(path)
            .cloned()
            .ok_or_else(|| ToolError::MissingInput(path.to_path_buf()))
    }
}
