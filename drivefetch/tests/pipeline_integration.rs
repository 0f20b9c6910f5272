//! End-to-end pipeline test: manifest in, organized files out.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use tempfile::TempDir;

use drivefetch::config::{DownloadConfig, PipelineConfig};
use drivefetch::transport::{HttpClient, HttpResponse, TransportError};
use drivefetch::{manifest, BatchRunner, FailureSink, RetryPolicy, RunContext};

/// Scripted HTTP client: replays queued responses in order.
struct ScriptedClient {
    responses: Mutex<VecDeque<HttpResponse>>,
}

impl ScriptedClient {
    fn new(responses: Vec<HttpResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

impl HttpClient for ScriptedClient {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::RequestFailed {
                url: url.to_string(),
                reason: "no scripted response left".to_string(),
            })
    }
}

fn png_response() -> HttpResponse {
    let mut body = Vec::new();
    let image = image::RgbImage::from_pixel(2, 2, image::Rgb([9, 9, 9]));
    image::DynamicImage::ImageRgb8(image)
        .write_to(
            &mut std::io::Cursor::new(&mut body),
            image::ImageFormat::Png,
        )
        .unwrap();
    HttpResponse {
        status: 200,
        content_type: Some("image/png".to_string()),
        body,
    }
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn manifest_row_with_mixed_slots_produces_expected_layout() {
    let temp = TempDir::new().unwrap();
    let manifest_path = temp.path().join("data.csv");
    std::fs::write(
        &manifest_path,
        "Team Number,Team Name,Submission Image 1,Submission Image 2,Submission Image 3,Submission Image 4\n\
         Team 7,The Sevens,https://drive.google.com/file/d/AAA111/view,,https://example.com/elsewhere,https://drive.google.com/uc?export=download&id=BBB222\n",
    )
    .unwrap();

    let rows = manifest::read_rows(&manifest_path).unwrap();
    assert_eq!(rows.len(), 1);

    let config = PipelineConfig::new()
        .with_download(DownloadConfig::new().with_retry(RetryPolicy::fixed(3, Duration::ZERO)))
        .with_row_delay(Duration::ZERO);
    let client = ScriptedClient::new(vec![png_response(), png_response()]);
    let runner = BatchRunner::new(client, config);

    let log_path = temp.path().join("failed.txt");
    let mut ctx = RunContext::new(FailureSink::create(&log_path).unwrap());

    let out = temp.path().join("out");
    let summary = runner.run(&rows, &out, &mut ctx);

    // Slots 1 and 4 succeed, slot 2 is skipped (not failed), slot 3 fails.
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 1);

    assert_eq!(file_names(&out.join("7")), vec!["Photo1.png", "Photo4.png"]);

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert_eq!(log.lines().count(), 1);
    assert!(log.contains("Photo3"));
}
