//! Error types for asset normalization.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while converting a fetched asset.
///
/// None of these are retryable: a decode that failed once will fail again,
/// so the pipeline records the failure and moves on, leaving the original
/// bytes on disk.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The codec layer does not recognize the file as a decodable image.
    #[error("unhandled file type: {}", path.display())]
    Unsupported { path: PathBuf },

    /// The file looked like a known format but could not be decoded.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    /// Re-encoding to the target format failed.
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },

    /// Filesystem error while reading the original or writing the result.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
