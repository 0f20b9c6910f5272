//! Content-type to file-extension resolution.
//!
//! Drive does not reveal the original filename on the plain download
//! endpoint, so the only type signal is the `Content-Type` response header.
//! The mapping is a flat table so that supporting a new format is a data
//! change rather than a code change.

use std::str::FromStr;

/// Content-type → extension table, checked in order.
///
/// Extensions are stored without the leading dot so they can be fed straight
/// into [`std::path::Path::with_extension`].
const EXTENSION_TABLE: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/bmp", "bmp"),
    ("image/webp", "webp"),
    ("image/tiff", "tiff"),
    ("application/pdf", "pdf"),
    ("video/mp4", "mp4"),
    ("video/avi", "avi"),
    ("video/mov", "mov"),
];

/// Extension assigned when the content type is missing or unmapped.
///
/// Deployments of the original pipeline disagreed on this value, so it is an
/// explicit policy knob rather than a hardcoded literal. The documented
/// default is [`FallbackExtension::Png`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackExtension {
    /// Treat unknown payloads as PNG (the default).
    Png,
    /// Treat unknown payloads as JPEG.
    Jpg,
    /// Keep unknown payloads as opaque binaries.
    Bin,
}

impl FallbackExtension {
    /// Returns the extension string, without the leading dot.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Bin => "bin",
        }
    }
}

impl Default for FallbackExtension {
    fn default() -> Self {
        Self::Png
    }
}

impl FromStr for FallbackExtension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "bin" => Ok(Self::Bin),
            other => Err(format!(
                "unknown fallback extension '{}' (expected png, jpg, or bin)",
                other
            )),
        }
    }
}

/// Resolves the file extension for a response content type.
///
/// The lookup is case-insensitive and ignores `;`-separated parameters such
/// as `charset`. A missing or unmapped content type resolves to `fallback`;
/// this function never fails.
pub fn extension_for(content_type: Option<&str>, fallback: FallbackExtension) -> &'static str {
    let Some(raw) = content_type else {
        return fallback.as_str();
    };

    let essence = raw
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    EXTENSION_TABLE
        .iter()
        .find(|(candidate, _)| *candidate == essence)
        .map(|(_, extension)| *extension)
        .unwrap_or_else(|| fallback.as_str())
}
