//! Filename grammar shared by the per-entity source files and the merged
//! outputs.
//!
//! Source files are named `<country><entity>-<start>[-<end>]<suffix>.<ext>`,
//! for example `DE3-2019-2021B.xlsx`. Merged outputs drop the entity number:
//! `DE-2019-2021B.xlsx`.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

/// Identity of a merge group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileKey {
    pub country: String,
    pub start_year: u16,
    pub end_year: Option<u16>,
    pub suffix: String,
}

impl FileKey {
    /// Number of periods (and so data sheets) the group spans.
    pub fn period_length(&self) -> usize {
        match self.end_year {
            Some(end) => usize::from(end - self.start_year) + 1,
            None => 1,
        }
    }

    /// `<start>[-<end>]<suffix>`, the part shared by source and output names.
    pub fn period_label(&self) -> String {
        match self.end_year {
            Some(end) => format!("{}-{}{}", self.start_year, end, self.suffix),
            None => format!("{}{}", self.start_year, self.suffix),
        }
    }

    /// Stem of the source file carrying `entity` for this key.
    pub fn source_stem(&self, entity: u32) -> String {
        format!("{}{}-{}", self.country, entity, self.period_label())
    }

    /// Canonical output file name with the given extension.
    pub fn output_name(&self, extension: &str) -> String {
        format!("{self}.{}", extension.trim_start_matches('.'))
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.country, self.period_label())
    }
}

/// Result of parsing a source file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub key: FileKey,
    pub entity: u32,
}

fn grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        Regex::new(
            r"^(?P<country>[A-Za-z]+)(?P<entity>[0-9]+)-(?P<start>[0-9]{4})(?:-(?P<end>[0-9]{4}))?(?P<suffix>[A-Za-z]+)$",
        )
        .expect("filename grammar is a valid regex")
    })
}

/// Parses a file name (with or without extension) against the source grammar.
///
/// Returns `None` for anything that does not match, for entity number 0, for
/// entity numbers that overflow `u32`, and for spans whose end year precedes
/// the start year.
pub fn parse(file_name: &str) -> Option<ParsedName> {
    let stem = Path::new(file_name).file_stem()?.to_str()?;
    parse_stem(stem)
}

/// Parses a bare stem such as `DE1-2020A`.
pub fn parse_stem(stem: &str) -> Option<ParsedName> {
    let captures = grammar().captures(stem)?;

    let entity: u32 = captures["entity"].parse().ok()?;
    if entity == 0 {
        return None;
    }

    let start_year: u16 = captures["start"].parse().ok()?;
    let end_year = match captures.name("end") {
        Some(end) => Some(end.as_str().parse::<u16>().ok()?),
        None => None,
    };
    if end_year.is_some_and(|end| end < start_year) {
        return None;
    }

    Some(ParsedName {
        key: FileKey {
            country: captures["country"].to_string(),
            start_year,
            end_year,
            suffix: captures["suffix"].to_string(),
        },
        entity,
    })
}

/// Canonical output name for a group, e.g. `DE-2019-2020B.xlsx`.
pub fn encode(key: &FileKey, extension: &str) -> String {
    key.output_name(extension)
}
