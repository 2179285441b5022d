use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use crate::panel::tools::error::{Result, ToolError};
use crate::panel::tools::model::{Cell, Workbook};

const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Writes the provided workbook to the given path, keeping cell types.
pub fn write_workbook(path: &Path, workbook: &Workbook) -> Result<()> {
    let mut workbook_writer = XlsxWorkbook::new();
    let date_format = Format::new().set_num_format(DATE_FORMAT);

    for sheet in workbook.sheets() {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for (row_idx, row) in sheet.rows().iter().enumerate() {
            let row_num = u32::try_from(row_idx).map_err(|_| too_large(&sheet.name))?;
            for (col_idx, cell) in row.iter().enumerate() {
                let col_num = u16::try_from(col_idx).map_err(|_| too_large(&sheet.name))?;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(value) | Cell::Error(value) => {
                        worksheet.write_string(row_num, col_num, value)?;
                    }
                    Cell::Number(value) => {
                        worksheet.write_number(row_num, col_num, *value)?;
                    }
                    Cell::Int(value) => {
                        worksheet.write_number(row_num, col_num, *value as f64)?;
                    }
                    Cell::Bool(value) => {
                        worksheet.write_boolean(row_num, col_num, *value)?;
                    }
                    Cell::DateTime(value) => {
                        worksheet.write_number_with_format(row_num, col_num, *value, &date_format)?;
                    }
                }
            }
        }
    }

    workbook_writer.save(path)?;
    Ok(())
}

/// Writes to a sibling `.partial` file first and renames it into place, so a
/// failed save never leaves a truncated file under the final name.
pub fn write_workbook_atomic(path: &Path, workbook: &Workbook) -> Result<()> {
    let staging = staging_path(path);
    if let Err(error) = write_workbook(&staging, workbook) {
        let _ = fs::remove_file(&staging);
        return Err(error);
    }
    fs::rename(&staging, path)?;
    Ok(())
}

pub(crate) fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

fn too_large(sheet: &str) -> ToolError {
    ToolError::InvalidWorkbook(format!("sheet '{sheet}' exceeds the Excel grid"))
}
