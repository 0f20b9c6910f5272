//! Error type for the CLI layer.

use std::io;
use std::path::PathBuf;

use drivefetch::config::ConfigError;
use drivefetch::manifest::ManifestError;
use drivefetch::TransportError;

/// Errors that abort a run before (or while) the batch starts.
///
/// Per-slot failures never surface here; they are contained by the
/// orchestrator and reported through the failure log and summary.
#[derive(Debug)]
pub enum CliError {
    /// The manifest could not be read.
    Manifest(ManifestError),

    /// The configuration file was invalid.
    Config(ConfigError),

    /// The HTTP client could not be constructed.
    Transport(TransportError),

    /// Filesystem setup failed (output root, failure log).
    Io { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manifest(error) => error.fmt(f),
            Self::Config(error) => error.fmt(f),
            Self::Transport(error) => error.fmt(f),
            Self::Io { path, source } => {
                write!(f, "i/o error on {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Manifest(error) => Some(error),
            Self::Config(error) => Some(error),
            Self::Transport(error) => Some(error),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ManifestError> for CliError {
    fn from(error: ManifestError) -> Self {
        Self::Manifest(error)
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}

impl From<TransportError> for CliError {
    fn from(error: TransportError) -> Self {
        Self::Transport(error)
    }
}
