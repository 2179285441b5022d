use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::panel::tools::error::Result;

/// What to do when two files in one group claim the same entity number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Keep the lexicographically last file and log a warning.
    #[default]
    Warn,
    /// Fail the affected group.
    Reject,
}

/// Location and content of the series identifiers in the request sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestTableContract {
    /// Name of the metadata sheet.
    pub sheet: String,
    /// Series token prefix; entity `n` is expected to carry `<prefix><n>`.
    pub series_prefix: String,
    /// Cell holding the series of the first period, in A1 notation. Later
    /// periods sit on the rows directly below.
    pub first_series_cell: String,
}

impl Default for RequestTableContract {
    fn default() -> Self {
        Self {
            sheet: "REQUEST_TABLE".to_string(),
            series_prefix: "FDEALL".to_string(),
            first_series_cell: "E7".to_string(),
        }
    }
}

impl RequestTableContract {
    pub fn expected_series(&self, entity: u32) -> String {
        format!("{}{}", self.series_prefix, entity)
    }
}

/// Settings for a merge run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// File extensions (without the dot) considered during the scan.
    pub extensions: Vec<String>,
    pub output_extension: String,
    pub duplicate_policy: DuplicatePolicy,
    pub request_table: RequestTableContract,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data-split-by-equity"),
            output_dir: PathBuf::from("data-split-by-variable"),
            extensions: default_extensions(),
            output_extension: "xlsx".to_string(),
            duplicate_policy: DuplicatePolicy::default(),
            request_table: RequestTableContract::default(),
        }
    }
}

impl MergeConfig {
    /// Loads a JSON configuration file; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

pub fn default_extensions() -> Vec<String> {
    vec!["xlsx".to_string(), "xlsm".to_string()]
}

/// Splits a comma separated extension list such as `xlsx, .xlsm`.
pub fn parse_extension_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_string())
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// Case-insensitive extension check against an allow-list.
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
}
