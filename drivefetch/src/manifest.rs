//! CSV submission manifest input.
//!
//! One row per team, with the column headers produced by the submission
//! form export: `Team Number`, `Team Name`, and `Submission Image 1..4`.
//! The manifest is consumed read-only; a missing or malformed file is a
//! pre-run error, unlike the per-slot failures handled later.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

/// Number of photo slots per submission row.
pub const SLOTS_PER_ROW: usize = 4;

/// One row of the submission manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionRow {
    /// Raw submitter label, e.g. `"Team 12"`.
    #[serde(rename = "Team Number")]
    pub team_label: String,

    /// Display name of the team.
    #[serde(rename = "Team Name")]
    pub team_name: String,

    #[serde(rename = "Submission Image 1", default, deserialize_with = "empty_as_none")]
    image1: Option<String>,
    #[serde(rename = "Submission Image 2", default, deserialize_with = "empty_as_none")]
    image2: Option<String>,
    #[serde(rename = "Submission Image 3", default, deserialize_with = "empty_as_none")]
    image3: Option<String>,
    #[serde(rename = "Submission Image 4", default, deserialize_with = "empty_as_none")]
    image4: Option<String>,
}

impl SubmissionRow {
    /// The row's slot cells in order. `None` marks an empty cell.
    pub fn slots(&self) -> [Option<&str>; SLOTS_PER_ROW] {
        [
            self.image1.as_deref(),
            self.image2.as_deref(),
            self.image3.as_deref(),
            self.image4.as_deref(),
        ]
    }
}

/// Errors raised while reading the manifest.
#[derive(Debug)]
pub enum ManifestError {
    /// The manifest file does not exist.
    NotFound { path: PathBuf },

    /// The file exists but could not be read or parsed as CSV.
    Parse { path: PathBuf, reason: String },
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { path } => {
                write!(f, "manifest not found: {}", path.display())
            }
            Self::Parse { path, reason } => {
                write!(f, "failed to parse manifest {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for ManifestError {}

/// Reads all submission rows from a CSV manifest.
pub fn read_rows(path: &Path) -> Result<Vec<SubmissionRow>, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_path(path).map_err(|e| ManifestError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    reader
        .deserialize()
        .collect::<Result<Vec<SubmissionRow>, _>>()
        .map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Treats empty or whitespace-only cells as absent.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}
