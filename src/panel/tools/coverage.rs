use std::collections::BTreeSet;

use crate::panel::tools::filename::FileKey;
use crate::panel::tools::grouping::{Group, GroupIndex};

/// Entity numbers missing from (or beyond) the expected range for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageRecord {
    pub key: FileKey,
    /// Entities in `1..=expected` with no file, ascending.
    pub missing_entities: Vec<u32>,
    /// Entities present but greater than `expected`, ascending.
    pub unexpected_entities: Vec<u32>,
}

impl CoverageRecord {
    pub fn is_complete(&self) -> bool {
        self.missing_entities.is_empty() && self.unexpected_entities.is_empty()
    }
}

/// Coverage of a single group against `1..=expected`.
pub fn group_coverage(group: &Group, expected: u32) -> CoverageRecord {
    let present: BTreeSet<u32> = group.members.keys().copied().collect();
    CoverageRecord {
        key: group.key.clone(),
        missing_entities: (1..=expected)
            .filter(|entity| !present.contains(entity))
            .collect(),
        unexpected_entities: present
            .range(expected.saturating_add(1)..)
            .copied()
            .collect(),
    }
}

/// Coverage of every group, in key order. Purely informational: it reads the
/// scan result only and is independent of merge outcomes.
pub fn coverage_report(index: &GroupIndex, expected: u32) -> Vec<CoverageRecord> {
    index
        .iter()
        .map(|group| group_coverage(group, expected))
        .collect()
}
