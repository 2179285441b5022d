use std::fmt;

use crate::panel::tools::error::{Result, ToolError};

/// A single spreadsheet cell value, independent of the library used to read or
/// write the workbook.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// Blank cell.
    #[default]
    Empty,
    /// Plain string.
    Text(String),
    /// Floating point number.
    Number(f64),
    /// Integer number, as reported by some readers.
    Int(i64),
    /// Boolean literal.
    Bool(bool),
    /// Excel date serial (days since 1899-12-30).
    DateTime(f64),
    /// Error value such as `#N/A`, kept as its display text.
    Error(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Returns the string payload of text cells.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(value) | Cell::Error(value) => f.write_str(value),
            Cell::Number(value) | Cell::DateTime(value) => write!(f, "{value}"),
            Cell::Int(value) => write!(f, "{value}"),
            Cell::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

pub type Row = Vec<Cell>;

/// Widest sheet Excel supports (column `XFD`).
const MAX_COLUMNS: usize = 16_384;

/// Zero-based cell coordinate parsed from A1 notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Parses references such as `E7` or `AB12`.
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        let split = reference
            .find(|ch: char| ch.is_ascii_digit())
            .ok_or_else(|| invalid_reference(reference))?;
        let (letters, digits) = reference.split_at(split);
        if letters.is_empty() || !letters.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return Err(invalid_reference(reference));
        }

        let row: usize = digits.parse().map_err(|_| invalid_reference(reference))?;
        if row == 0 {
            return Err(invalid_reference(reference));
        }

        let col = letters
            .chars()
            .try_fold(0usize, |acc, ch| {
                let digit = ch.to_ascii_uppercase() as usize - 'A' as usize + 1;
                acc.checked_mul(26)?.checked_add(digit)
            })
            .filter(|col| *col <= MAX_COLUMNS)
            .ok_or_else(|| invalid_reference(reference))?;

        Ok(Self::new(row - 1, col - 1))
    }

    /// Moves the reference down by `rows`.
    pub fn offset_rows(self, rows: usize) -> Self {
        Self::new(self.row + rows, self.col)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letters = Vec::new();
        let mut col = self.col + 1;
        while col > 0 {
            let rem = (col - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            col = (col - 1) / 26;
        }
        letters.reverse();
        let letters: String = letters.into_iter().collect();
        write!(f, "{letters}{}", self.row + 1)
    }
}

fn invalid_reference(reference: &str) -> ToolError {
    ToolError::InvalidArgument(format!("'{reference}' is not a valid cell reference"))
}

/// A named worksheet. Rows are stored densely from cell A1 so that
/// `cell_at(0, 0)` always addresses A1, whatever range the reader reported.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Row>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(col))
    }

    /// Mutable access to a cell, growing the grid if needed.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, Cell::Empty);
        }
        &mut cells[col]
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Every row after the header.
    pub fn data_rows(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Widest row in the sheet.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// `(data rows, columns)`; the header is not counted as a data row.
    pub fn shape(&self) -> (usize, usize) {
        (self.data_rows().len(), self.column_count())
    }

    /// Appends rows after the current last row, preserving their order.
    pub fn append_rows<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = Row>,
    {
        self.rows.extend(rows);
    }
}

/// An ordered collection of sheets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn push_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str())
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|sheet| sheet.name == name)
    }

    pub fn sheet_at(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheet_at_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }
}
