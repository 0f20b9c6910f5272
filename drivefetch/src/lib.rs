//! Drivefetch - batch acquisition of photo submissions from Google Drive
//!
//! This library downloads the files referenced by a CSV of share links
//! (one row per team, up to four photo slots per row), classifies each
//! payload by content type, converts it to a single canonical image
//! encoding, and stores it as `output/<team>/Photo<slot>.<ext>`.
//!
//! The library is organized into the following modules:
//! - [`link`] - share-link parsing and team-label normalization
//! - [`transport`] - HTTP fetch with the Drive confirmation handshake and retries
//! - [`filetype`] - content-type to file-extension resolution
//! - [`normalize`] - conversion of fetched assets to the target encoding
//! - [`telemetry`] - failure log and run counters
//! - [`manifest`] - CSV submission manifest input
//! - [`batch`] - the sequential row/slot orchestrator
//! - [`config`] - pipeline configuration and `config.ini` loading

pub mod batch;
pub mod config;
pub mod filetype;
pub mod link;
pub mod manifest;
pub mod normalize;
pub mod telemetry;
pub mod transport;

pub use batch::{BatchRunner, RunSummary};
pub use config::{ConfigError, ConfigFile, DownloadConfig, NormalizeConfig, PipelineConfig};
pub use filetype::FallbackExtension;
pub use link::FileId;
pub use manifest::{read_rows, ManifestError, SubmissionRow, SLOTS_PER_ROW};
pub use normalize::{NormalizeError, PngCompression, TargetFormat};
pub use telemetry::{FailureSink, RunContext, RunCounters};
pub use transport::{DriveFetcher, HttpClient, ReqwestClient, RetryPolicy, TransportError};

/// Crate version, for banners and logs.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
