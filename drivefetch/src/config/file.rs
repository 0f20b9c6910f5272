//! Optional `config.ini` loading.
//!
//! Every key is optional; absent keys leave the compiled-in defaults (or a
//! CLI flag applied later) in place. Recognized layout:
//!
//! ```ini
//! [download]
//! timeout = 30
//! retries = 3
//! backoff_secs = 2
//!
//! [convert]
//! format = png          ; png | jpeg
//! png_compression = max ; fast | balanced | max
//! jpeg_quality = 85
//! skip = false
//!
//! [output]
//! fallback_extension = png ; png | jpg | bin
//! row_delay_secs = 1
//! ```

use std::path::Path;
use std::time::Duration;

use ini::Ini;

use super::PipelineConfig;
use crate::filetype::FallbackExtension;
use crate::normalize::{PngCompression, TargetFormat, DEFAULT_JPEG_QUALITY};
use crate::transport::{RetryPolicy, DEFAULT_BACKOFF_SECS, DEFAULT_MAX_ATTEMPTS};

/// Errors raised while reading a configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read or parsed as INI.
    Load { path: String, reason: String },

    /// A key held a value that does not parse.
    InvalidValue {
        section: &'static str,
        key: &'static str,
        reason: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load { path, reason } => {
                write!(f, "failed to load config {}: {}", path, reason)
            }
            Self::InvalidValue {
                section,
                key,
                reason,
            } => {
                write!(f, "invalid [{}] {}: {}", section, key, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Which canonical encoding the `[convert] format` key selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetChoice {
    Png,
    Jpeg,
}

/// Parsed, still-optional configuration file values.
#[derive(Debug, Default)]
pub struct ConfigFile {
    timeout_secs: Option<u64>,
    retries: Option<u32>,
    backoff_secs: Option<u64>,
    format: Option<TargetChoice>,
    png_compression: Option<PngCompression>,
    jpeg_quality: Option<u8>,
    skip_conversion: Option<bool>,
    fallback_extension: Option<FallbackExtension>,
    row_delay_secs: Option<u64>,
}

impl ConfigFile {
    /// Loads and validates `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut file = Self::default();

        if let Some(download) = ini.section(Some("download")) {
            file.timeout_secs = parse_key(download.get("timeout"), "download", "timeout")?;
            file.retries = parse_key(download.get("retries"), "download", "retries")?;
            file.backoff_secs =
                parse_key(download.get("backoff_secs"), "download", "backoff_secs")?;
        }

        if let Some(convert) = ini.section(Some("convert")) {
            file.format = match convert.get("format").map(str::trim) {
                None => None,
                Some(value) if value.eq_ignore_ascii_case("png") => Some(TargetChoice::Png),
                Some(value) if value.eq_ignore_ascii_case("jpeg") || value.eq_ignore_ascii_case("jpg") => {
                    Some(TargetChoice::Jpeg)
                }
                Some(other) => {
                    return Err(ConfigError::InvalidValue {
                        section: "convert",
                        key: "format",
                        reason: format!("'{}' (expected png or jpeg)", other),
                    })
                }
            };
            file.png_compression = convert
                .get("png_compression")
                .map(|value| {
                    value.parse().map_err(|reason| ConfigError::InvalidValue {
                        section: "convert",
                        key: "png_compression",
                        reason,
                    })
                })
                .transpose()?;
            file.jpeg_quality = parse_key(convert.get("jpeg_quality"), "convert", "jpeg_quality")?;
            file.skip_conversion = convert
                .get("skip")
                .map(|value| parse_bool(value, "convert", "skip"))
                .transpose()?;
        }

        if let Some(output) = ini.section(Some("output")) {
            file.fallback_extension = output
                .get("fallback_extension")
                .map(|value| {
                    value.parse().map_err(|reason| ConfigError::InvalidValue {
                        section: "output",
                        key: "fallback_extension",
                        reason,
                    })
                })
                .transpose()?;
            file.row_delay_secs =
                parse_key(output.get("row_delay_secs"), "output", "row_delay_secs")?;
        }

        Ok(file)
    }

    /// Applies the file's values over `base`, leaving unset keys alone.
    pub fn apply(&self, base: PipelineConfig) -> PipelineConfig {
        let mut config = base;

        if let Some(secs) = self.timeout_secs {
            config.download.timeout = Duration::from_secs(secs);
        }
        if self.retries.is_some() || self.backoff_secs.is_some() {
            config.download.retry = RetryPolicy::fixed(
                self.retries.unwrap_or(DEFAULT_MAX_ATTEMPTS),
                Duration::from_secs(self.backoff_secs.unwrap_or(DEFAULT_BACKOFF_SECS)),
            );
        }

        match self.format {
            Some(TargetChoice::Jpeg) => {
                config.normalize.target = TargetFormat::Jpeg {
                    quality: self.jpeg_quality.unwrap_or(DEFAULT_JPEG_QUALITY),
                };
            }
            Some(TargetChoice::Png) => {
                config.normalize.target = TargetFormat::Png {
                    compression: self.png_compression.unwrap_or(PngCompression::Max),
                };
            }
            None => {
                if let Some(compression) = self.png_compression {
                    config.normalize.target = TargetFormat::Png { compression };
                }
            }
        }
        if let Some(skip) = self.skip_conversion {
            config.normalize.skip_conversion = skip;
        }

        if let Some(fallback) = self.fallback_extension {
            config.fallback_extension = fallback;
        }
        if let Some(secs) = self.row_delay_secs {
            config.row_delay = Duration::from_secs(secs);
        }

        config
    }
}

fn parse_key<T: std::str::FromStr>(
    value: Option<&str>,
    section: &'static str,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .map(|raw| {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                section,
                key,
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn parse_bool(
    value: &str,
    section: &'static str,
    key: &'static str,
) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            section,
            key,
            reason: format!("'{}' is not a boolean", other),
        }),
    }
}
