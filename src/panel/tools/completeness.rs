//! Pre-merge check that every entity × year × variable-group file exists.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::instrument;

use crate::panel::tools::config::has_extension;
use crate::panel::tools::error::{Result, ToolError};
use crate::panel::tools::filename::FileKey;

const MAX_GROUPS: usize = 26;

/// Shape of the expected file grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSpec {
    pub country: String,
    pub entity_count: u32,
    pub start_year: u16,
    pub end_year: u16,
    /// Number of variable groups; suffixes run `A`, `B`, ...
    pub group_count: usize,
    pub extensions: Vec<String>,
}

impl GridSpec {
    pub fn validate(&self) -> Result<()> {
        if self.entity_count < 1 {
            return Err(ToolError::InvalidArgument(
                "entity count must be at least 1".into(),
            ));
        }
        if self.start_year > self.end_year {
            return Err(ToolError::InvalidArgument(format!(
                "start year {} is after end year {}",
                self.start_year, self.end_year
            )));
        }
        if !(1..=MAX_GROUPS).contains(&self.group_count) {
            return Err(ToolError::InvalidArgument(format!(
                "variable group count must be between 1 and {MAX_GROUPS}"
            )));
        }
        Ok(())
    }

    pub fn suffixes(&self) -> impl Iterator<Item = char> {
        ('A'..='Z').take(self.group_count)
    }

    /// Every stem the grid expects, ordered by entity, then year, then group.
    pub fn expected_stems(&self) -> Vec<String> {
        let mut stems = Vec::new();
        for entity in 1..=self.entity_count {
            for year in self.start_year..=self.end_year {
                for suffix in self.suffixes() {
                    let key = FileKey {
                        country: self.country.clone(),
                        start_year: year,
                        end_year: None,
                        suffix: suffix.to_string(),
                    };
                    stems.push(key.source_stem(entity));
                }
            }
        }
        stems
    }

    pub fn expected_total(&self) -> usize {
        let years = usize::from(self.end_year - self.start_year) + 1;
        self.entity_count as usize * years * self.group_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletenessReport {
    pub expected_total: usize,
    /// Files in the folder with an allowed extension, matching or not.
    pub actual_count: usize,
    pub missing: Vec<String>,
}

impl CompletenessReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Compares the expected grid against the stems found in `present`.
pub fn check_stems(spec: &GridSpec, present: &BTreeSet<String>) -> Result<CompletenessReport> {
    spec.validate()?;
    let missing = spec
        .expected_stems()
        .into_iter()
        .filter(|stem| !present.contains(stem))
        .collect();

    Ok(CompletenessReport {
        expected_total: spec.expected_total(),
        actual_count: present.len(),
        missing,
    })
}

/// Lists `dir` and checks it against the expected grid.
#[instrument(level = "info", skip_all, fields(dir = %dir.display(), country = %spec.country))]
pub fn check_directory(dir: &Path, spec: &GridSpec) -> Result<CompletenessReport> {
    if !dir.is_dir() {
        return Err(ToolError::MissingInput(dir.to_path_buf()));
    }

    let mut present = BTreeSet::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !has_extension(&path, &spec.extensions) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            present.insert(stem.to_string());
        }
    }

    check_stems(spec, &present)
}
