use std::path::Path;

use crate::panel::tools::config::RequestTableContract;
use crate::panel::tools::error::{Result, ValidationError};
use crate::panel::tools::model::{CellRef, Workbook};

/// Checks a workbook against the contract encoded in its file name.
///
/// In order, stopping at the first failure:
/// 1. the request sheet exists;
/// 2. each of the `period_length` series cells, starting at the contract's
///    first cell and moving down one row per period, holds
///    `<prefix><entity>`;
/// 3. the workbook has at least `period_length` sheets.
///
/// The workbook is never modified.
pub fn validate_workbook(
    workbook: &Workbook,
    file: &Path,
    entity: u32,
    period_length: usize,
    contract: &RequestTableContract,
) -> Result<()> {
    let first_cell = CellRef::parse(&contract.first_series_cell)?;
    check(workbook, file, entity, period_length, contract, first_cell)?;
    Ok(())
}

fn check(
    workbook: &Workbook,
    file: &Path,
    entity: u32,
    period_length: usize,
    contract: &RequestTableContract,
    first_cell: CellRef,
) -> std::result::Result<(), ValidationError> {
    let request = workbook
        .sheet(&contract.sheet)
        .ok_or_else(|| ValidationError::MissingRequestTable {
            file: file.to_path_buf(),
            sheet: contract.sheet.clone(),
        })?;

    let expected = contract.expected_series(entity);
    for period in 0..period_length {
        let cell = first_cell.offset_rows(period);
        let value = request.cell_at(cell.row, cell.col);
        if value.and_then(|v| v.as_str()) != Some(expected.as_str()) {
            return Err(ValidationError::SeriesMismatch {
                file: file.to_path_buf(),
                sheet: contract.sheet.clone(),
                cell: cell.to_string(),
                expected,
                found: value.map(ToString::to_string).unwrap_or_default(),
            });
        }
    }

    if workbook.sheet_count() < period_length {
        return Err(ValidationError::InsufficientSheets {
            file: file.to_path_buf(),
            expected: period_length,
            actual: workbook.sheet_count(),
        });
    }

    Ok(())
}
