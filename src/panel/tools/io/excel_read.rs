use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::panel::tools::error::{Result, ToolError};
use crate::panel::tools::model::{Cell, Row, Sheet, Workbook};

/// Reads every sheet of an Excel workbook, in workbook order.
pub fn read_workbook(path: &Path) -> Result<Workbook> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let names = workbook.sheet_names().to_vec();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = read_required_sheet(&mut workbook, &name)?;
        sheets.push(range_to_sheet(name, &range));
    }

    Ok(Workbook::from_sheets(sheets))
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

/// calamine trims the range to the used area; pad it back so row 0 and
/// column 0 are A1.
fn range_to_sheet(name: String, range: &calamine::Range<DataType>) -> Sheet {
    let Some((start_row, start_col)) = range.start() else {
        return Sheet::new(name);
    };

    let mut rows: Vec<Row> = vec![Vec::new(); start_row as usize];
    for source_row in range.rows() {
        let mut row: Row = vec![Cell::Empty; start_col as usize];
        row.extend(source_row.iter().map(convert_cell));
        rows.push(row);
    }

    Sheet::with_rows(name, rows)
}

fn convert_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::String(value) => Cell::Text(value.clone()),
        DataType::Float(value) => Cell::Number(*value),
        DataType::Int(value) => Cell::Int(*value),
        DataType::Bool(value) => Cell::Bool(*value),
        DataType::DateTime(value) => Cell::DateTime(*value),
        DataType::Error(error) => Cell::Error(error.to_string()),
        DataType::Empty => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}
