use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::panel::tools::config::RequestTableContract;
use crate::panel::tools::error::{Result, ToolError};
use crate::panel::tools::grouping::Group;
use crate::panel::tools::io::WorkbookSource;
use crate::panel::tools::model::{Row, Workbook};
use crate::panel::tools::validate::validate_workbook;

/// Shape of one source sheet appended into the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendedSheet {
    pub file: PathBuf,
    pub entity: u32,
    pub sheet: String,
    /// Data rows appended (header excluded).
    pub rows: usize,
    pub columns: usize,
}

/// A consolidated workbook plus the per-sheet progress of how it was built.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub workbook: Workbook,
    pub appended: Vec<AppendedSheet>,
}

/// Merges every member of `group` into a copy of its entity 1 workbook.
///
/// Members are visited in ascending entity order. Each one is validated and
/// has all of its data sheets resolved before any of its rows are appended,
/// so a failing member never leaves part of its data in the template. Nothing
/// is written to disk here.
#[instrument(level = "info", skip_all, fields(group = %group.key))]
pub fn merge_group<S>(
    group: &Group,
    source: &S,
    contract: &RequestTableContract,
) -> Result<MergeOutcome>
where
    S: WorkbookSource + ?Sized,
{
    let template_file = group.template().ok_or_else(|| ToolError::MissingTemplate {
        group: group.key.to_string(),
    })?;

    let period_length = group.period_length();
    let mut merged = source.load(&template_file.path)?;
    validate_workbook(&merged, &template_file.path, 1, period_length, contract)?;
    debug!(template = %template_file.path.display(), period_length, "template validated");

    let template_sheets: Vec<String> = merged
        .sheet_names()
        .take(period_length)
        .map(str::to_string)
        .collect();

    let mut appended = Vec::new();
    for member in group.non_template_members() {
        let workbook = source.load(&member.path)?;
        validate_workbook(&workbook, &member.path, member.entity, period_length, contract)?;

        let batches = collect_data_rows(&workbook, &member.path, &template_sheets)?;
        for (sheet_name, rows, columns) in batches {
            info!(
                file = %member.path.display(),
                sheet = %sheet_name,
                rows = rows.len(),
                columns,
                "appending sheet"
            );
            appended.push(AppendedSheet {
                file: member.path.clone(),
                entity: member.entity,
                sheet: sheet_name.clone(),
                rows: rows.len(),
                columns,
            });
            let target = merged.sheet_mut(&sheet_name).ok_or_else(|| {
                ToolError::InvalidWorkbook(format!("template lost sheet '{sheet_name}'"))
            })?;
            target.append_rows(rows);
        }
    }

    Ok(MergeOutcome {
        workbook: merged,
        appended,
    })
}

type SheetBatch = (String, Vec<Row>, usize);

/// Resolves every template sheet name in `workbook` and clones its data rows.
fn collect_data_rows(
    workbook: &Workbook,
    file: &Path,
    sheet_names: &[String],
) -> Result<Vec<SheetBatch>> {
    sheet_names
        .iter()
        .map(|name| -> Result<SheetBatch> {
            let sheet = workbook
                .sheet(name)
                .ok_or_else(|| ToolError::SheetNotFound {
                    file: file.to_path_buf(),
                    sheet: name.clone(),
                })?;
            let (_, columns) = sheet.shape();
            Ok((name.clone(), sheet.data_rows().to_vec(), columns))
        })
        .collect()
}
