//! One logical fetch against the Drive download endpoint.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::thread;

use regex::Regex;
use tracing::{debug, warn};

use super::error::TransportError;
use super::http::HttpClient;
use super::retry::RetryPolicy;
use crate::filetype::{self, FallbackExtension};
use crate::link::FileId;
use crate::telemetry::FailureSink;

/// Plain download endpoint; the file id is appended as a query parameter.
const DOWNLOAD_ENDPOINT: &str = "https://drive.google.com/uc?export=download";

/// Substring that marks the large-file virus-scan warning page.
///
/// Files above Drive's scan threshold return an HTML interstitial instead of
/// the payload; the real download needs a follow-up request carrying the
/// one-time token embedded in that page.
const CONFIRM_MARKER: &str = "download_warning";

/// Downloads assets by file id, absorbing the provider's confirmation
/// handshake and transient failures behind a single call.
///
/// Each attempt fetches, resolves the extension from the response content
/// type, and writes the bytes to `<dest_stem>.<ext>`. Failed attempts are
/// recorded in the failure sink and retried per the policy; only the final
/// give-up is returned to the caller.
pub struct DriveFetcher<C: HttpClient> {
    http_client: C,
    retry: RetryPolicy,
}

impl<C: HttpClient> DriveFetcher<C> {
    /// Creates a fetcher with the given client and retry policy.
    pub fn new(http_client: C, retry: RetryPolicy) -> Self {
        Self { http_client, retry }
    }

    /// Fetches one asset and stages it next to `dest_stem`.
    ///
    /// `dest_stem` is the destination path without an extension
    /// (e.g. `out/7/Photo1`); the extension is resolved from the response.
    /// Returns the path actually written.
    pub fn download(
        &self,
        id: &FileId,
        dest_stem: &Path,
        fallback: FallbackExtension,
        sink: &mut FailureSink,
    ) -> Result<PathBuf, TransportError> {
        let mut attempt = 1u32;
        loop {
            match self.try_download(id, dest_stem, fallback) {
                Ok(path) => {
                    debug!(%id, attempt, path = %path.display(), "download complete");
                    return Ok(path);
                }
                Err(error) => {
                    warn!(%id, attempt, %error, "download attempt failed");
                    sink.record(&format!("attempt {} failed for id {}: {}", attempt, id, error));

                    match self.retry.delay_for_attempt(attempt) {
                        Some(delay) => {
                            thread::sleep(delay);
                            attempt += 1;
                        }
                        None => {
                            return Err(TransportError::RetriesExhausted {
                                id: id.to_string(),
                                attempts: attempt,
                            });
                        }
                    }
                }
            }
        }
    }

    /// One attempt: GET, optional confirmation follow-up, stage to disk.
    fn try_download(
        &self,
        id: &FileId,
        dest_stem: &Path,
        fallback: FallbackExtension,
    ) -> Result<PathBuf, TransportError> {
        let url = Self::download_url(id);
        let mut response = self.http_client.get(&url)?;

        // The warning page replaces the payload; the token-bearing follow-up
        // response is the one actually consumed.
        let token = {
            let text = String::from_utf8_lossy(&response.body);
            if text.contains(CONFIRM_MARKER) {
                Some(confirm_token(&text).ok_or_else(|| {
                    TransportError::ConfirmTokenMissing { id: id.to_string() }
                })?)
            } else {
                None
            }
        };
        if let Some(token) = token {
            debug!(%id, "large-file confirmation required");
            response = self.http_client.get(&Self::confirm_url(id, &token))?;
        }

        if !response.is_success() {
            return Err(TransportError::Status {
                url,
                status: response.status,
            });
        }

        let extension = filetype::extension_for(response.content_type.as_deref(), fallback);
        let final_path = dest_stem.with_extension(extension);
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent).map_err(|source| TransportError::WriteFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        if let Err(source) = fs::write(&final_path, &response.body) {
            // Do not leave a half-written file behind for a later attempt
            // (or the operator) to mistake for a complete download.
            let _ = fs::remove_file(&final_path);
            return Err(TransportError::WriteFailed {
                path: final_path,
                source,
            });
        }

        Ok(final_path)
    }

    fn download_url(id: &FileId) -> String {
        format!("{}&id={}", DOWNLOAD_ENDPOINT, id)
    }

    fn confirm_url(id: &FileId, token: &str) -> String {
        format!("{}&confirm={}&id={}", DOWNLOAD_ENDPOINT, token, id)
    }
}

/// Extracts the one-time confirmation token from the warning page body.
fn confirm_token(text: &str) -> Option<String> {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    let pattern = TOKEN.get_or_init(|| Regex::new(r"confirm=([A-Za-z0-9_-]+)").unwrap());
    pattern.captures(text).map(|captures| captures[1].to_string())
}
