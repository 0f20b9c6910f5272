//! Pipeline configuration.
//!
//! Every policy knob the pipeline exposes lives here: transport timeout and
//! retry, the target encoding and its parameters, the fallback extension for
//! unknown content types, and the pacing delay between manifest rows.
//! Values resolve CLI flag > `config.ini` > documented default.

mod file;

pub use file::{ConfigError, ConfigFile};

use std::time::Duration;

use crate::filetype::FallbackExtension;
use crate::normalize::TargetFormat;
use crate::transport::RetryPolicy;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default pacing delay between manifest rows, in seconds.
pub const DEFAULT_ROW_DELAY_SECS: u64 = 1;

/// Transport-side settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
}

impl DownloadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-request timeout in seconds.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

/// Normalizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeConfig {
    /// Canonical encoding assets are converted to.
    pub target: TargetFormat,
    /// When set, fetched bytes are the final output regardless of type.
    pub skip_conversion: bool,
}

impl NormalizeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target encoding.
    pub fn with_target(mut self, target: TargetFormat) -> Self {
        self.target = target;
        self
    }

    /// Toggle the "uncompressed" mode that bypasses conversion entirely.
    pub fn with_skip_conversion(mut self, skip: bool) -> Self {
        self.skip_conversion = skip;
        self
    }
}

/// Top-level configuration for one batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Transport settings.
    pub download: DownloadConfig,
    /// Normalizer settings.
    pub normalize: NormalizeConfig,
    /// Extension assigned to unmapped content types.
    pub fallback_extension: FallbackExtension,
    /// Pacing delay inserted between manifest rows.
    pub row_delay: Duration,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_download(mut self, download: DownloadConfig) -> Self {
        self.download = download;
        self
    }

    pub fn with_normalize(mut self, normalize: NormalizeConfig) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_fallback_extension(mut self, fallback: FallbackExtension) -> Self {
        self.fallback_extension = fallback;
        self
    }

    pub fn with_row_delay(mut self, delay: Duration) -> Self {
        self.row_delay = delay;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            download: DownloadConfig::default(),
            normalize: NormalizeConfig::default(),
            fallback_extension: FallbackExtension::default(),
            row_delay: Duration::from_secs(DEFAULT_ROW_DELAY_SECS),
        }
    }
}
