use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, instrument, warn};

use crate::panel::tools::config::{DuplicatePolicy, MergeConfig};
use crate::panel::tools::coverage::{CoverageRecord, coverage_report};
use crate::panel::tools::error::{Result, ToolError};
use crate::panel::tools::filename::{self, FileKey};
use crate::panel::tools::grouping::{Group, GroupIndex, scan_directory};
use crate::panel::tools::io::{WorkbookSource, excel_write};
use crate::panel::tools::merge::{AppendedSheet, merge_group};
use crate::panel::tools::model::Workbook;

/// Groups found in the input folder and where each merged workbook will go.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub index: GroupIndex,
    pub output_dir: PathBuf,
    pub output_extension: String,
}

impl RunPlan {
    pub fn target_path(&self, key: &FileKey) -> PathBuf {
        self.output_dir
            .join(filename::encode(key, &self.output_extension))
    }

    /// Targets left over from an earlier run, in group order.
    pub fn existing_outputs(&self) -> Vec<PathBuf> {
        self.index
            .iter()
            .map(|group| self.target_path(&group.key))
            .filter(|path| path.exists())
            .collect()
    }
}

/// Answer to the single overwrite question asked before any group runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteDecision {
    Approved,
    Declined,
}

/// Scans the configured input folder.
#[instrument(level = "info", skip_all, fields(input = %config.input_dir.display()))]
pub fn plan_run(config: &MergeConfig) -> Result<RunPlan> {
    let index = scan_directory(&config.input_dir, &config.extensions)?;
    info!(group_count = index.len(), "source files grouped");
    Ok(RunPlan {
        index,
        output_dir: config.output_dir.clone(),
        output_extension: config.output_extension.clone(),
    })
}

/// Pre-flight gate: deletes leftover outputs when approved, refuses the whole
/// run when declined. Returns the deleted paths.
pub fn clear_existing_outputs(plan: &RunPlan, decision: OverwriteDecision) -> Result<Vec<PathBuf>> {
    let existing = plan.existing_outputs();
    if existing.is_empty() {
        return Ok(existing);
    }
    if decision == OverwriteDecision::Declined {
        return Err(ToolError::DestructiveOverwriteDeclined { paths: existing });
    }

    for path in &existing {
        fs::remove_file(path)?;
        info!(path = %path.display(), "removed previous output");
    }
    Ok(existing)
}

/// How one group ended.
#[derive(Debug)]
pub enum GroupStatus {
    Written {
        output: PathBuf,
        appended: Vec<AppendedSheet>,
    },
    Failed(ToolError),
}

#[derive(Debug)]
pub struct GroupOutcome {
    pub key: FileKey,
    pub status: GroupStatus,
}

impl GroupOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self.status, GroupStatus::Written { .. })
    }
}

/// Everything a merge run produced.
#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<GroupOutcome>,
    pub coverage: Vec<CoverageRecord>,
}

impl RunReport {
    pub fn written(&self) -> impl Iterator<Item = &GroupOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_written())
    }

    pub fn failed(&self) -> impl Iterator<Item = &GroupOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_written())
    }

    /// Coverage records with gaps or out-of-range entities.
    pub fn incomplete_coverage(&self) -> impl Iterator<Item = &CoverageRecord> {
        self.coverage.iter().filter(|record| !record.is_complete())
    }
}

/// Merges and writes every group of `plan`. A failing group is reported and
/// skipped; the others still run. Call [`clear_existing_outputs`] first.
#[instrument(level = "info", skip_all, fields(output = %plan.output_dir.display()))]
pub fn execute<S>(
    plan: &RunPlan,
    source: &S,
    config: &MergeConfig,
    expected_entities: u32,
) -> Result<RunReport>
where
    S: WorkbookSource + ?Sized,
{
    fs::create_dir_all(&plan.output_dir)?;

    let mut outcomes = Vec::with_capacity(plan.index.len());
    for group in plan.index.iter() {
        let status = match consolidate_group(plan, group, source, config) {
            Ok((output, appended)) => {
                info!(group = %group.key, output = %output.display(), "group written");
                GroupStatus::Written { output, appended }
            }
            Err(err) => {
                error!(group = %group.key, error = %err, "group skipped");
                GroupStatus::Failed(err)
            }
        };
        outcomes.push(GroupOutcome {
            key: group.key.clone(),
            status,
        });
    }

    let coverage = coverage_report(&plan.index, expected_entities);
    for record in coverage.iter().filter(|record| !record.is_complete()) {
        warn!(
            group = %record.key,
            missing = ?record.missing_entities,
            unexpected = ?record.unexpected_entities,
            "entity coverage differs from expectation"
        );
    }

    Ok(RunReport { outcomes, coverage })
}

fn consolidate_group<S>(
    plan: &RunPlan,
    group: &Group,
    source: &S,
    config: &MergeConfig,
) -> Result<(PathBuf, Vec<AppendedSheet>)>
where
    S: WorkbookSource + ?Sized,
{
    if config.duplicate_policy == DuplicatePolicy::Reject {
        group.ensure_unique()?;
    }

    let outcome = merge_group(group, source, &config.request_table)?;
    let output = plan.target_path(&group.key);
    write_output(&output, &outcome.workbook)?;
    Ok((output, outcome.appended))
}

fn write_output(path: &Path, workbook: &Workbook) -> Result<()> {
    excel_write::write_workbook_atomic(path, workbook)
}
