//! Drivefetch CLI - fetch and organize photo submissions.
//!
//! Reads a submission manifest CSV, downloads every referenced Drive file,
//! converts it to the configured target encoding, and lays the results out
//! as `<output>/<team>/Photo<slot>.<ext>`. Settings resolve CLI flag >
//! `config.ini` > built-in default.

mod error;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use drivefetch::config::{ConfigFile, PipelineConfig};
use drivefetch::manifest;
use drivefetch::transport::DEFAULT_BACKOFF_SECS;
use drivefetch::{
    BatchRunner, FailureSink, FallbackExtension, PngCompression, ReqwestClient, RetryPolicy,
    RunContext, RunSummary, TargetFormat,
};

use crate::error::CliError;

/// Name of the configuration file picked up from the working directory
/// when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "config.ini";

#[derive(Parser, Debug)]
#[command(
    name = "drivefetch",
    version = drivefetch::VERSION,
    about = "Download and organize Google Drive photo submissions"
)]
struct Cli {
    /// Path to the submission manifest CSV.
    manifest: PathBuf,

    /// Output root directory.
    #[arg(short, long, default_value = "public/image")]
    output: PathBuf,

    /// Configuration file (defaults to ./config.ini when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Failure log location.
    #[arg(long, default_value = "failed.txt")]
    failure_log: PathBuf,

    /// Keep the fetched bytes as-is, skipping conversion entirely.
    #[arg(long)]
    skip_conversion: bool,

    /// Canonical target encoding.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Quality for the jpeg target (1-100).
    #[arg(long)]
    jpeg_quality: Option<u8>,

    /// Compression effort for the png target.
    #[arg(long, value_enum)]
    png_compression: Option<CompressionArg>,

    /// Extension for unknown content types.
    #[arg(long, value_enum)]
    fallback_ext: Option<FallbackArg>,

    /// Attempts per download (including the first).
    #[arg(long)]
    retries: Option<u32>,

    /// Seconds between attempts.
    #[arg(long)]
    backoff: Option<u64>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Seconds to pause between manifest rows.
    #[arg(long)]
    row_delay: Option<u64>,

    /// Keep any existing output instead of starting from a clean directory.
    #[arg(long)]
    keep_existing: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompressionArg {
    Fast,
    Balanced,
    Max,
}

impl From<CompressionArg> for PngCompression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Fast => PngCompression::Fast,
            CompressionArg::Balanced => PngCompression::Balanced,
            CompressionArg::Max => PngCompression::Max,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FallbackArg {
    Png,
    Jpg,
    Bin,
}

impl From<FallbackArg> for FallbackExtension {
    fn from(arg: FallbackArg) -> Self {
        match arg {
            FallbackArg::Png => FallbackExtension::Png,
            FallbackArg::Jpg => FallbackExtension::Jpg,
            FallbackArg::Bin => FallbackExtension::Bin,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(summary) if summary.failed > 0 => process::exit(1),
        Ok(_) => {}
        Err(error) => {
            eprintln!("error: {}", error);
            process::exit(2);
        }
    }
}

fn run(cli: Cli) -> Result<RunSummary, CliError> {
    let rows = manifest::read_rows(&cli.manifest)?;
    let config = resolve_config(&cli)?;
    debug!(?config, "resolved configuration");

    prepare_output_root(&cli.output, cli.keep_existing)?;
    let sink = FailureSink::create(&cli.failure_log).map_err(|source| CliError::Io {
        path: cli.failure_log.clone(),
        source,
    })?;
    let mut ctx = RunContext::new(sink);

    let client = ReqwestClient::with_timeout(config.download.timeout)?;
    let runner = BatchRunner::new(client, config);

    println!("Drivefetch v{}", drivefetch::VERSION);
    println!("Manifest: {} ({} rows)", cli.manifest.display(), rows.len());
    println!("Output:   {}", cli.output.display());
    println!();

    let summary = runner.run(&rows, &cli.output, &mut ctx);

    let output_location = cli
        .output
        .canonicalize()
        .unwrap_or_else(|_| cli.output.clone());
    println!();
    println!("Download summary");
    println!("  Succeeded: {}", summary.succeeded);
    println!("  Failed:    {}", summary.failed);
    println!("  Skipped:   {}", summary.skipped);
    if summary.failed > 0 {
        println!("  Failures logged to {}", ctx.sink.path().display());
    }
    println!("  Files organized in {}", output_location.display());

    Ok(summary)
}

/// Builds the pipeline configuration: defaults, then `config.ini`, then flags.
fn resolve_config(cli: &Cli) -> Result<PipelineConfig, CliError> {
    let mut config = PipelineConfig::default();

    let config_path = cli
        .config
        .clone()
        .or_else(|| Path::new(DEFAULT_CONFIG_FILE).exists().then(|| PathBuf::from(DEFAULT_CONFIG_FILE)));
    if let Some(path) = config_path {
        config = ConfigFile::load(&path)?.apply(config);
    }

    if let Some(secs) = cli.timeout {
        config.download.timeout = Duration::from_secs(secs);
    }
    if cli.retries.is_some() || cli.backoff.is_some() {
        let attempts = cli.retries.unwrap_or(config.download.retry.max_attempts());
        let delay = cli
            .backoff
            .map(Duration::from_secs)
            .or_else(|| config.download.retry.delay_for_attempt(1))
            .unwrap_or(Duration::from_secs(DEFAULT_BACKOFF_SECS));
        config.download.retry = RetryPolicy::fixed(attempts, delay);
    }

    match cli.format {
        Some(FormatArg::Jpeg) => {
            config.normalize.target = TargetFormat::Jpeg {
                quality: cli
                    .jpeg_quality
                    .unwrap_or(drivefetch::normalize::DEFAULT_JPEG_QUALITY),
            };
        }
        Some(FormatArg::Png) => {
            config.normalize.target = TargetFormat::Png {
                compression: cli
                    .png_compression
                    .map(PngCompression::from)
                    .unwrap_or(PngCompression::Max),
            };
        }
        None => {
            if let Some(compression) = cli.png_compression {
                config.normalize.target = TargetFormat::Png {
                    compression: compression.into(),
                };
            }
        }
    }
    if cli.skip_conversion {
        config.normalize.skip_conversion = true;
    }

    if let Some(fallback) = cli.fallback_ext {
        config.fallback_extension = fallback.into();
    }
    if let Some(secs) = cli.row_delay {
        config.row_delay = Duration::from_secs(secs);
    }

    Ok(config)
}

/// Removes any previous run's output unless asked to keep it.
fn prepare_output_root(output: &Path, keep_existing: bool) -> Result<(), CliError> {
    if !keep_existing && output.exists() {
        fs::remove_dir_all(output).map_err(|source| CliError::Io {
            path: output.to_path_buf(),
            source,
        })?;
    }
    fs::create_dir_all(output).map_err(|source| CliError::Io {
        path: output.to_path_buf(),
        source,
    })
}
