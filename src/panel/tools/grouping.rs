use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::panel::tools::config::has_extension;
use crate::panel::tools::error::{Result, ToolError};
use crate::panel::tools::filename::{self, FileKey};

/// One input workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub entity: u32,
    pub key: FileKey,
    pub path: PathBuf,
}

/// A second file claiming an entity number that was already taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateEntity {
    pub entity: u32,
    pub kept: PathBuf,
    pub dropped: PathBuf,
}

/// All files sharing a [`FileKey`], indexed by entity number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub key: FileKey,
    pub members: BTreeMap<u32, SourceFile>,
    pub duplicates: Vec<DuplicateEntity>,
}

impl Group {
    fn new(key: FileKey) -> Self {
        Self {
            key,
            members: BTreeMap::new(),
            duplicates: Vec::new(),
        }
    }

    pub fn period_length(&self) -> usize {
        self.key.period_length()
    }

    /// The entity 1 file every other member is appended into.
    pub fn template(&self) -> Option<&SourceFile> {
        self.members.get(&1)
    }

    /// Members other than the template, in ascending entity order.
    pub fn non_template_members(&self) -> impl Iterator<Item = &SourceFile> {
        self.members.range(2..).map(|(_, file)| file)
    }

    /// Fails with the first duplicate, if any.
    pub fn ensure_unique(&self) -> Result<()> {
        match self.duplicates.first() {
            Some(duplicate) => Err(ToolError::DuplicateEntity {
                group: self.key.to_string(),
                entity: duplicate.entity,
                kept: duplicate.kept.clone(),
                dropped: duplicate.dropped.clone(),
            }),
            None => Ok(()),
        }
    }

    fn insert(&mut self, file: SourceFile) {
        let entity = file.entity;
        if let Some(previous) = self.members.insert(entity, file) {
            let kept = self.members[&entity].path.clone();
            warn!(
                group = %self.key,
                entity,
                kept = %kept.display(),
                dropped = %previous.path.display(),
                "duplicate entity number, keeping the later file"
            );
            self.duplicates.push(DuplicateEntity {
                entity,
                kept,
                dropped: previous.path,
            });
        }
    }
}

/// Groups discovered during a directory scan, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupIndex {
    pub groups: BTreeMap<FileKey, Group>,
}

impl GroupIndex {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn get(&self, key: &FileKey) -> Option<&Group> {
        self.groups.get(key)
    }
}

/// Buckets paths into groups. Paths are processed in the order given; for
/// duplicate entity numbers the later path wins. Paths that do not follow the
/// filename grammar are skipped.
pub fn build_groups<I>(paths: I) -> GroupIndex
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut index = GroupIndex::default();

    for path in paths {
        let Some(parsed) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(filename::parse)
        else {
            debug!(path = %path.display(), "skipping file outside the naming grammar");
            continue;
        };

        index
            .groups
            .entry(parsed.key.clone())
            .or_insert_with(|| Group::new(parsed.key.clone()))
            .insert(SourceFile {
                entity: parsed.entity,
                key: parsed.key,
                path,
            });
    }

    index
}

/// Scans `dir` for regular files with an allowed extension and groups them.
/// Entries are visited in file-name order so that duplicate resolution does
/// not depend on the platform's directory order.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub fn scan_directory(dir: &Path, extensions: &[String]) -> Result<GroupIndex> {
    if !dir.is_dir() {
        return Err(ToolError::MissingInput(dir.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if has_extension(&path, extensions) {
            paths.push(path);
        }
    }
    paths.sort_by(|lhs, rhs| lhs.file_name().cmp(&rhs.file_name()));

    let index = build_groups(paths);
    debug!(group_count = index.len(), "directory grouped");
    Ok(index)
}
