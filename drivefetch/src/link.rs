//! Share-link parsing.
//!
//! Google Drive share links come in several shapes depending on how the
//! submitter copied them. All of them embed the same opaque file identifier,
//! which is the only part the download endpoint needs. This module extracts
//! that identifier and also normalizes the "Team N" labels used to name
//! output directories.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Host marker that every recognized share link must contain.
const DRIVE_HOST: &str = "drive.google.com";

/// Opaque Google Drive file identifier extracted from a share link.
///
/// Guaranteed non-empty; construction goes through [`extract_file_id`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId(String);

impl FileId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extracts the file identifier from a Drive share link.
///
/// Returns `None` if the URL is empty, does not contain the Drive host
/// marker, or matches none of the known link shapes. Patterns are tried in
/// fixed priority order and the first match wins:
///
/// 1. `id=` query parameter (`.../uc?export=download&id=FILE_ID`)
/// 2. `/d/` path segment (`.../d/FILE_ID/view`)
/// 3. `file/d/` path segment (`.../file/d/FILE_ID/view`)
pub fn extract_file_id(url: &str) -> Option<FileId> {
    if url.is_empty() || !url.contains(DRIVE_HOST) {
        return None;
    }

    for pattern in id_patterns() {
        if let Some(captures) = pattern.captures(url) {
            return Some(FileId(captures[1].to_string()));
        }
    }

    None
}

fn id_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"id=([A-Za-z0-9_-]+)").unwrap(),
            Regex::new(r"/d/([A-Za-z0-9_-]+)").unwrap(),
            Regex::new(r"file/d/([A-Za-z0-9_-]+)").unwrap(),
        ]
    })
}

/// Normalizes a submitter label like `"Team 12"` to its output directory name.
///
/// Returns the numeric remainder when the label matches `Team <digits>`.
/// Any other label falls back to the raw text with a literal `Team ` prefix
/// stripped and surrounding whitespace trimmed, so a malformed row still
/// gets a usable directory.
pub fn team_directory_name(label: &str) -> String {
    static TEAM_NUMBER: OnceLock<Regex> = OnceLock::new();
    let pattern = TEAM_NUMBER.get_or_init(|| Regex::new(r"Team (\d+)").unwrap());

    match pattern.captures(label) {
        Some(captures) => captures[1].to_string(),
        None => label.replace("Team ", "").trim().to_string(),
    }
}
