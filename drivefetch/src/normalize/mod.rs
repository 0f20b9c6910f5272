//! Conversion of fetched assets into the canonical target encoding.
//!
//! Whatever a submitter uploaded — BMP, TIFF, WebP, GIF — comes out of this
//! module as one configured format so the downstream site template can rely
//! on a single extension per slot. Conversion is replace-on-success: the
//! re-encoded file is fully written before the original is deleted, so an
//! interrupted run never leaves a half-converted intermediate as the slot's
//! only file.

mod error;

pub use error::NormalizeError;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageError, ImageReader};
use tracing::info;

use crate::config::NormalizeConfig;

/// Default JPEG quality when the lossy target is selected without one.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Compression effort for the lossless PNG target.
///
/// Maps onto the `image` crate's encoder levels; `Max` trades encode time
/// for the smallest output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngCompression {
    Fast,
    Balanced,
    Max,
}

impl From<PngCompression> for CompressionType {
    fn from(compression: PngCompression) -> Self {
        match compression {
            PngCompression::Fast => CompressionType::Fast,
            PngCompression::Balanced => CompressionType::Default,
            PngCompression::Max => CompressionType::Best,
        }
    }
}

impl FromStr for PngCompression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "max" => Ok(Self::Max),
            other => Err(format!(
                "unknown png compression '{}' (expected fast, balanced, or max)",
                other
            )),
        }
    }
}

/// The canonical encoding all convertible assets end up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    /// Lossless PNG with a configurable compression effort.
    Png { compression: PngCompression },
    /// Lossy JPEG with an explicit quality level.
    Jpeg { quality: u8 },
}

impl TargetFormat {
    /// Extension of files in this encoding, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png { .. } => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }

    /// Whether a file extension already counts as this encoding.
    fn matches_extension(&self, extension: &str) -> bool {
        match self {
            Self::Png { .. } => extension == "png",
            Self::Jpeg { .. } => extension == "jpg" || extension == "jpeg",
        }
    }
}

impl Default for TargetFormat {
    fn default() -> Self {
        Self::Png {
            compression: PngCompression::Max,
        }
    }
}

/// Converts `path` to the configured target encoding.
///
/// Returns the final path of the slot's asset:
/// - unchanged when `skip_conversion` is set or the file is already in the
///   target encoding;
/// - the re-encoded sibling path otherwise, with the original deleted only
///   after the new file is fully written.
///
/// Files the codec layer cannot ingest (PDF, video, corrupt data) fail with
/// [`NormalizeError::Unsupported`] or [`NormalizeError::Decode`] and are
/// left on disk untouched.
pub fn normalize(path: &Path, config: &NormalizeConfig) -> Result<PathBuf, NormalizeError> {
    if config.skip_conversion {
        return Ok(path.to_path_buf());
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if config.target.matches_extension(&extension) {
        return Ok(path.to_path_buf());
    }

    let image = decode(path)?;
    let encoded = encode(&image, config.target, path)?;

    let target_path = path.with_extension(config.target.extension());
    if let Err(source) = fs::write(&target_path, &encoded) {
        let _ = fs::remove_file(&target_path);
        return Err(NormalizeError::Io {
            path: target_path,
            source,
        });
    }
    fs::remove_file(path).map_err(|source| NormalizeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        from = %path.display(),
        to = %target_path.display(),
        "converted"
    );
    Ok(target_path)
}

fn decode(path: &Path) -> Result<DynamicImage, NormalizeError> {
    let reader = ImageReader::open(path)
        .map_err(|source| NormalizeError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .with_guessed_format()
        .map_err(|source| NormalizeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    if reader.format().is_none() {
        return Err(NormalizeError::Unsupported {
            path: path.to_path_buf(),
        });
    }

    reader.decode().map_err(|source| match source {
        ImageError::Unsupported(_) => NormalizeError::Unsupported {
            path: path.to_path_buf(),
        },
        source => NormalizeError::Decode {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn encode(
    image: &DynamicImage,
    target: TargetFormat,
    path: &Path,
) -> Result<Vec<u8>, NormalizeError> {
    let mut encoded = Vec::new();
    match target {
        TargetFormat::Png { compression } => {
            let encoder =
                PngEncoder::new_with_quality(&mut encoded, compression.into(), FilterType::Adaptive);
            image
                .write_with_encoder(encoder)
                .map_err(|source| NormalizeError::Encode {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        TargetFormat::Jpeg { quality } => {
            let encoder = JpegEncoder::new_with_quality(&mut encoded, quality);
            // JPEG carries no alpha channel; flatten before encoding.
            DynamicImage::ImageRgb8(image.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(|source| NormalizeError::Encode {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
    }
    Ok(encoded)
}
