//! Sequential row/slot orchestration.
//!
//! One slot's fetch and conversion completes (success or exhausted-retry
//! failure) before the next begins. Failures never cross a slot boundary:
//! each one is logged to the failure sink, counted, and the run moves on.

use std::fs;
use std::path::Path;
use std::thread;

use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::link;
use crate::manifest::SubmissionRow;
use crate::normalize;
use crate::telemetry::RunContext;
use crate::transport::{DriveFetcher, HttpClient};

/// Outcome of one batch invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Slots that produced a final file.
    pub succeeded: u32,
    /// Slots that failed at any stage.
    pub failed: u32,
    /// Slots with no link in the manifest.
    pub skipped: u32,
}

/// Drives the fetch → stage → normalize sequence over a manifest.
pub struct BatchRunner<C: HttpClient> {
    fetcher: DriveFetcher<C>,
    config: PipelineConfig,
}

impl<C: HttpClient> BatchRunner<C> {
    /// Creates a runner from an HTTP client and pipeline configuration.
    pub fn new(http_client: C, config: PipelineConfig) -> Self {
        let fetcher = DriveFetcher::new(http_client, config.download.retry.clone());
        Self { fetcher, config }
    }

    /// Processes every row against `output_root`.
    ///
    /// Team directories are created on demand; a fixed pacing delay is
    /// inserted between rows (not between slots) out of politeness toward
    /// the remote host. Returns the run's tallies; per-failure detail goes
    /// to the failure sink in `ctx`.
    pub fn run(
        &self,
        rows: &[SubmissionRow],
        output_root: &Path,
        ctx: &mut RunContext,
    ) -> RunSummary {
        for (index, row) in rows.iter().enumerate() {
            self.process_row(row, output_root, ctx);

            if index + 1 < rows.len() {
                thread::sleep(self.config.row_delay);
            }
        }

        let counters = ctx.counters;
        RunSummary {
            succeeded: counters.succeeded,
            failed: counters.failed,
            skipped: counters.skipped,
        }
    }

    fn process_row(&self, row: &SubmissionRow, output_root: &Path, ctx: &mut RunContext) {
        let team = link::team_directory_name(&row.team_label);
        info!(team = %team, name = %row.team_name, "processing row");

        let team_dir = output_root.join(&team);
        if let Err(error) = fs::create_dir_all(&team_dir) {
            warn!(team = %team, %error, "could not create team directory");
            ctx.record_failure(&format!(
                "team {}: could not create {}: {}",
                team,
                team_dir.display(),
                error
            ));
            return;
        }

        for (index, slot) in row.slots().iter().enumerate() {
            let slot_number = index + 1;
            match slot {
                None => {
                    info!(team = %team, slot = slot_number, "no link, skipping");
                    ctx.counters.record_skip();
                }
                Some(url) => self.process_slot(url, slot_number, &team, &team_dir, ctx),
            }
        }
    }

    fn process_slot(
        &self,
        url: &str,
        slot_number: usize,
        team: &str,
        team_dir: &Path,
        ctx: &mut RunContext,
    ) {
        let Some(id) = link::extract_file_id(url) else {
            warn!(team = %team, slot = slot_number, url, "no file id in link");
            ctx.record_failure(&format!(
                "team {}: no file id in link for Photo{} ({})",
                team, slot_number, url
            ));
            return;
        };

        info!(team = %team, slot = slot_number, %id, "downloading");
        let dest_stem = team_dir.join(format!("Photo{}", slot_number));
        let staged = match self.fetcher.download(
            &id,
            &dest_stem,
            self.config.fallback_extension,
            &mut ctx.sink,
        ) {
            Ok(path) => path,
            Err(error) => {
                ctx.record_failure(&format!(
                    "team {}: download failed for Photo{} (id {}): {}",
                    team, slot_number, id, error
                ));
                return;
            }
        };

        match normalize::normalize(&staged, &self.config.normalize) {
            Ok(final_path) => {
                info!(team = %team, slot = slot_number, path = %final_path.display(), "stored");
                ctx.counters.record_success();
            }
            Err(error) => {
                ctx.record_failure(&format!(
                    "team {}: conversion failed for {}: {}",
                    team,
                    staged.display(),
                    error
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::config::{DownloadConfig, NormalizeConfig, PipelineConfig};
    use crate::telemetry::FailureSink;
    use crate::transport::{ok_response, status_response, MockHttpClient, RetryPolicy, TransportError};

    /// Config with zeroed delays so tests do not sleep.
    fn quick_config() -> PipelineConfig {
        PipelineConfig::new()
            .with_download(
                DownloadConfig::new().with_retry(RetryPolicy::fixed(3, Duration::ZERO)),
            )
            .with_row_delay(Duration::ZERO)
    }

    fn context(temp: &TempDir) -> RunContext {
        RunContext::new(FailureSink::create(&temp.path().join("failed.txt")).unwrap())
    }

    fn row(label: &str, name: &str, slots: [&str; 4]) -> SubmissionRow {
        let csv = format!(
            "Team Number,Team Name,Submission Image 1,Submission Image 2,Submission Image 3,Submission Image 4\n{},{},{},{},{},{}\n",
            label, name, slots[0], slots[1], slots[2], slots[3]
        );
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        reader.deserialize().next().unwrap().unwrap()
    }

    fn encoded_png() -> Vec<u8> {
        let mut bytes = Vec::new();
        let image = image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3]));
        image::DynamicImage::ImageRgb8(image)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_end_to_end_row_with_mixed_slots() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        let png = encoded_png();

        // Slots: valid, empty, malformed, valid. Two fetches expected.
        let mock = MockHttpClient::new(vec![
            Ok(ok_response("image/png", &png)),
            Ok(ok_response("image/png", &png)),
        ]);
        let runner = BatchRunner::new(mock, quick_config());
        let mut ctx = context(&temp);

        let rows = [row(
            "Team 7",
            "The Sevens",
            [
                "https://drive.google.com/file/d/AAA111/view",
                "",
                "https://example.com/not-a-drive-link",
                "https://drive.google.com/file/d/BBB222/view",
            ],
        )];
        let summary = runner.run(&rows, &out, &mut ctx);

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);

        // Exactly two final files, named for their slots.
        assert_eq!(files_in(&out.join("7")), vec!["Photo1.png", "Photo4.png"]);

        // One failure-log entry, for the malformed slot 3.
        let log = fs::read_to_string(temp.path().join("failed.txt")).unwrap();
        assert_eq!(log.lines().count(), 1);
        assert!(log.contains("Photo3"));
    }

    #[test]
    fn test_failed_download_does_not_abort_the_batch() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        let png = encoded_png();

        // First slot exhausts its three attempts; second succeeds.
        let mock = MockHttpClient::new(vec![
            Ok(status_response(500)),
            Ok(status_response(500)),
            Ok(status_response(500)),
            Ok(ok_response("image/png", &png)),
        ]);
        let runner = BatchRunner::new(mock, quick_config());
        let mut ctx = context(&temp);

        let rows = [row(
            "Team 3",
            "Threes",
            [
                "https://drive.google.com/file/d/AAA111/view",
                "https://drive.google.com/file/d/BBB222/view",
                "",
                "",
            ],
        )];
        let summary = runner.run(&rows, &out, &mut ctx);

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(files_in(&out.join("3")), vec!["Photo2.png"]);

        // Three attempt records plus the slot's final failure record.
        let log = fs::read_to_string(temp.path().join("failed.txt")).unwrap();
        assert_eq!(log.lines().count(), 4);
    }

    #[test]
    fn test_network_errors_are_contained_per_slot() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");

        let mock = MockHttpClient::new(vec![
            Err(TransportError::RequestFailed {
                url: "u".to_string(),
                reason: "dns failure".to_string(),
            }),
            Err(TransportError::RequestFailed {
                url: "u".to_string(),
                reason: "dns failure".to_string(),
            }),
            Err(TransportError::RequestFailed {
                url: "u".to_string(),
                reason: "dns failure".to_string(),
            }),
        ]);
        let runner = BatchRunner::new(mock, quick_config());
        let mut ctx = context(&temp);

        let rows = [row(
            "Team 9",
            "Nines",
            ["https://drive.google.com/file/d/AAA111/view", "", "", ""],
        )];
        let summary = runner.run(&rows, &out, &mut ctx);

        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 1);
        // The team directory exists but holds no final file.
        assert!(files_in(&out.join("9")).is_empty());
    }

    #[test]
    fn test_unconvertible_asset_counts_failed_but_stays_on_disk() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");

        let mock = MockHttpClient::new(vec![Ok(ok_response(
            "application/pdf",
            b"%PDF-1.4 definitely not an image",
        ))]);
        let runner = BatchRunner::new(mock, quick_config());
        let mut ctx = context(&temp);

        let rows = [row(
            "Team 5",
            "Fives",
            ["https://drive.google.com/file/d/AAA111/view", "", "", ""],
        )];
        let summary = runner.run(&rows, &out, &mut ctx);

        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 1);
        // Unconvertible originals are preserved for the operator.
        assert_eq!(files_in(&out.join("5")), vec!["Photo1.pdf"]);

        let log = fs::read_to_string(temp.path().join("failed.txt")).unwrap();
        assert!(log.contains("unhandled file type"));
    }

    #[test]
    fn test_skip_conversion_keeps_original_encoding() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");

        let mock = MockHttpClient::new(vec![Ok(ok_response("image/gif", b"GIF89a fake"))]);
        let config =
            quick_config().with_normalize(NormalizeConfig::new().with_skip_conversion(true));
        let runner = BatchRunner::new(mock, config);
        let mut ctx = context(&temp);

        let rows = [row(
            "Team 2",
            "Twos",
            ["https://drive.google.com/file/d/AAA111/view", "", "", ""],
        )];
        let summary = runner.run(&rows, &out, &mut ctx);

        assert_eq!(summary.succeeded, 1);
        assert_eq!(files_in(&out.join("2")), vec!["Photo1.gif"]);
    }

    #[test]
    fn test_non_numeric_label_uses_fallback_directory() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        let png = encoded_png();

        let mock = MockHttpClient::new(vec![Ok(ok_response("image/png", &png))]);
        let runner = BatchRunner::new(mock, quick_config());
        let mut ctx = context(&temp);

        let rows = [row(
            "Team Alpha",
            "Alphas",
            ["https://drive.google.com/file/d/AAA111/view", "", "", ""],
        )];
        runner.run(&rows, &out, &mut ctx);

        assert_eq!(files_in(&out.join("Alpha")), vec!["Photo1.png"]);
    }
}
