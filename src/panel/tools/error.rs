use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool scans, validates, merges, or emits workbooks.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the JSON configuration file cannot be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the CSV reader or writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when a workbook cannot be represented by the internal model.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// A member workbook failed one of the structural checks.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The group has no entity 1 file to serve as the merge template.
    #[error("missing entity 1 template, cannot merge group {group}")]
    MissingTemplate { group: String },

    /// A member workbook lacks a sheet that the template declares.
    #[error("{} has no sheet named '{sheet}'", .file.display())]
    SheetNotFound { file: PathBuf, sheet: String },

    /// Two files claim the same entity number inside one group.
    #[error(
        "group {group} has more than one file for entity {entity}: kept {}, dropped {}",
        .kept.display(),
        .dropped.display()
    )]
    DuplicateEntity {
        group: String,
        entity: u32,
        kept: PathBuf,
        dropped: PathBuf,
    },

    /// The user refused to delete outputs left by a previous run.
    #[error("refused to overwrite {} existing output file(s)", .paths.len())]
    DestructiveOverwriteDeclined { paths: Vec<PathBuf> },

    /// Raised when a numeric or textual argument is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input path not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Discriminant of [`ValidationError`], handy for matching in reports and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    MissingRequestTable,
    SeriesMismatch,
    InsufficientSheets,
}

/// Structural or content contract violated by a single workbook.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{} is missing the {sheet} sheet", .file.display())]
    MissingRequestTable { file: PathBuf, sheet: String },

    #[error(
        "{sheet} series does not match the file name in {}: cell {cell} holds '{found}', expected '{expected}'",
        .file.display()
    )]
    SeriesMismatch {
        file: PathBuf,
        sheet: String,
        cell: String,
        expected: String,
        found: String,
    },

    #[error(
        "{} has too few sheets: expected at least {expected}, found {actual}",
        .file.display()
    )]
    InsufficientSheets {
        file: PathBuf,
        expected: usize,
        actual: usize,
    },
}

impl ValidationError {
    pub fn kind(&self) -> ValidationKind {
        match self {
            ValidationError::MissingRequestTable { .. } => ValidationKind::MissingRequestTable,
            ValidationError::SeriesMismatch { .. } => ValidationKind::SeriesMismatch,
            ValidationError::InsufficientSheets { .. } => ValidationKind::InsufficientSheets,
        }
    }

    /// The workbook that failed validation.
    pub fn file(&self) -> &Path {
        match self {
            ValidationError::MissingRequestTable { file, .. }
            | ValidationError::SeriesMismatch { file, .. }
            | ValidationError::InsufficientSheets { file, .. } => file,
        }
    }
}
