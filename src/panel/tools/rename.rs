//! Normalises vendor column headers such as `X(WC02051)~U$.1` into the
//! canonical `XWC02051U` form.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, instrument};

use crate::panel::tools::error::{Result, ToolError};
use crate::panel::tools::io::csv_headers;
use crate::panel::tools::io::{WorkbookSource, excel_write};
use crate::panel::tools::model::{Cell, Workbook};

/// Column holding the country code in the consolidated sheet (column B).
const COUNTRY_COLUMN: usize = 1;

/// A header that changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRename {
    pub column: usize,
    pub from: String,
    pub to: String,
}

fn currency_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Z])\((WC[0-9]+)\)~([A-Z]+)(\$(?:\.[0-9]+)?)?$")
            .expect("currency header pattern is a valid regex")
    })
}

fn plain_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Z]\((WC[0-9]+)\)$").expect("plain header pattern is a valid regex")
    })
}

/// Maps one header to its canonical name:
///
/// - `Type` → `DSCD`
/// - `X(WC06705)~U`, `X(WC18545)~U$`, `X(WC02051)~U$.1`, `X(WC04601)~US` →
///   `XWC06705U` etc. (the currency code collapses to `U`)
/// - `X(WC01254)` → `WC01254`
///
/// Anything else is returned unchanged.
pub fn rename_column(header: &str) -> String {
    if header == "Type" {
        return "DSCD".to_string();
    }
    if let Some(captures) = currency_pattern().captures(header) {
        return format!("{}{}U", &captures[1], &captures[2]);
    }
    if let Some(captures) = plain_pattern().captures(header) {
        return captures[1].to_string();
    }
    header.to_string()
}

/// Renames the header row of the first sheet in place.
pub fn rename_workbook_headers(workbook: &mut Workbook) -> Vec<HeaderRename> {
    let Some(sheet) = workbook.sheet_at_mut(0) else {
        return Vec::new();
    };
    let width = sheet.header().map(Vec::len).unwrap_or(0);

    let mut renames = Vec::new();
    for column in 0..width {
        let cell = sheet.cell_mut(0, column);
        let Some(current) = cell.as_str() else {
            continue;
        };
        let renamed = rename_column(current);
        if renamed != current {
            renames.push(HeaderRename {
                column,
                from: current.to_string(),
                to: renamed.clone(),
            });
            *cell = Cell::Text(renamed);
        }
    }
    renames
}

/// Identity of a country cell. Text and numbers never collapse into each
/// other, while `1` and `1.0` do.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum CountryKey {
    Text(String),
    Number(String),
    Bool,
}

impl CountryKey {
    /// `None` for blank, empty, zero and `false` cells.
    fn of(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::Empty => None,
            Cell::Text(value) | Cell::Error(value) => {
                (!value.is_empty()).then(|| CountryKey::Text(value.clone()))
            }
            Cell::Number(value) | Cell::DateTime(value) => {
                (*value != 0.0).then(|| CountryKey::Number(value.to_string()))
            }
            Cell::Int(value) => (*value != 0).then(|| CountryKey::Number(value.to_string())),
            Cell::Bool(value) => value.then_some(CountryKey::Bool),
        }
    }
}

/// Distinct country codes in column B of the first sheet.
pub fn count_countries(workbook: &Workbook) -> usize {
    let Some(sheet) = workbook.sheet_at(0) else {
        return 0;
    };
    sheet
        .data_rows()
        .iter()
        .filter_map(|row| row.get(COUNTRY_COLUMN))
        .filter_map(CountryKey::of)
        .collect::<BTreeSet<_>>()
        .len()
}

/// Default output name for a renamed workbook, e.g. `12countries.xlsx`.
pub fn countries_file_name(country_count: usize) -> String {
    format!("{country_count}countries.xlsx")
}

/// Default output name for a renamed CSV: `<stem>-renamed.csv`.
pub fn renamed_csv_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}-renamed.csv"))
}

/// Input formats handled by the rename utility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Xlsx,
    Csv,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(TableFormat::Csv),
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xlsm") => {
                Ok(TableFormat::Xlsx)
            }
            _ => Err(ToolError::InvalidArgument(format!(
                "cannot rename headers of {}: expected .xlsx, .xlsm or .csv",
                path.display()
            ))),
        }
    }
}

/// Loaded workbook with headers already renamed, waiting to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct RenamedWorkbook {
    pub workbook: Workbook,
    pub renames: Vec<HeaderRename>,
    pub country_count: usize,
}

impl RenamedWorkbook {
    pub fn default_output(&self, input: &Path) -> PathBuf {
        input.with_file_name(countries_file_name(self.country_count))
    }
}

/// Loads `input` and renames the headers of its first sheet.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn prepare_workbook<S>(input: &Path, source: &S) -> Result<RenamedWorkbook>
where
    S: WorkbookSource + ?Sized,
{
    let mut workbook = source.load(input)?;
    let renames = rename_workbook_headers(&mut workbook);
    let country_count = count_countries(&workbook);
    info!(renamed = renames.len(), country_count, "headers renamed");
    Ok(RenamedWorkbook {
        workbook,
        renames,
        country_count,
    })
}

/// Writes a renamed workbook, all sheets included.
pub fn write_renamed_workbook(output: &Path, renamed: &RenamedWorkbook) -> Result<()> {
    excel_write::write_workbook_atomic(output, &renamed.workbook)
}

/// Copies a CSV file with its header row renamed. All values stay text.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn rename_csv(input: &Path, output: &Path) -> Result<Vec<HeaderRename>> {
    let renames = csv_headers::rewrite_headers(input, output, rename_column)?;
    info!(renamed = renames.len(), "CSV headers renamed");
    Ok(renames)
}
