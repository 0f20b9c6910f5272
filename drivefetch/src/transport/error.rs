//! Error types for the transport layer.

use std::io;
use std::path::PathBuf;

/// Errors that can occur while fetching one asset.
///
/// Everything except [`TransportError::RetriesExhausted`] describes a single
/// attempt; the retry loop wraps the final give-up in `RetriesExhausted`.
#[derive(Debug)]
pub enum TransportError {
    /// The underlying HTTP client could not be constructed.
    ClientBuild(String),

    /// The request itself failed (network error, timeout, malformed response).
    RequestFailed { url: String, reason: String },

    /// The final response carried a non-success status code.
    Status { url: String, status: u16 },

    /// The body signalled the large-file warning but carried no token.
    ConfirmTokenMissing { id: String },

    /// Writing the fetched bytes to the staging path failed.
    WriteFailed { path: PathBuf, source: io::Error },

    /// All attempts in the retry budget were consumed.
    RetriesExhausted { id: String, attempts: u32 },
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClientBuild(reason) => {
                write!(f, "failed to create HTTP client: {}", reason)
            }
            Self::RequestFailed { url, reason } => {
                write!(f, "request to {} failed: {}", url, reason)
            }
            Self::Status { url, status } => {
                write!(f, "HTTP {} from {}", status, url)
            }
            Self::ConfirmTokenMissing { id } => {
                write!(f, "confirmation page for id {} carried no token", id)
            }
            Self::WriteFailed { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            Self::RetriesExhausted { id, attempts } => {
                write!(f, "giving up on id {} after {} attempts", id, attempts)
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::WriteFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}
