//! Submission flow.
//!
//! One conversion attempt walks `Idle → Validating → Submitting →
//! {Succeeded, Failed} → Idle`: trim and validate the input, POST the
//! conversion request, interpret the JSON reply, then trigger the download
//! fetch. The submit control is restored on every exit path (a drop guard
//! plays the `finally` role), and at most one submission can be in flight
//! at a time.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::convert::{self, ConvertRequest};
use crate::download::{self, FetchedFile};
use crate::fingerprint::FingerprintProfile;
use crate::notify::{Notice, UiSink};
use crate::validate;

const INVALID_URL_MESSAGE: &str = "Please enter a valid YouTube URL";
const RETRY_MESSAGE: &str = "An error occurred. Please try again.";

/// Failure of a submission that reached the network.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The backend answered with an `error` field.
    #[error("{0}")]
    Server(String),
    /// The request was rejected in transit or the reply was unusable.
    #[error("{0}")]
    Network(String),
}

/// Result of one submission attempt. Every variant has already produced its
/// UI feedback by the time it is returned.
#[derive(Debug)]
pub enum Outcome {
    /// Input was empty after trimming: shake played, nothing sent.
    EmptyInput,
    /// Input failed validation: error notice shown, nothing sent.
    InvalidUrl,
    /// Another submission was in flight: ignored, nothing sent.
    Busy,
    /// Conversion succeeded. `file` is the fetched download when the fetch
    /// itself worked; the success notice does not depend on it.
    Converted {
        file: Option<FetchedFile>,
        cached: bool,
    },
    /// The backend reported an error or the call itself failed.
    Failed(SubmitError),
}

/// One conversion front end: holds the service endpoint, the impersonation
/// profile, and the UI sink its feedback goes to.
pub struct Submitter {
    service_url: String,
    download_dir: PathBuf,
    quality: Option<u32>,
    timeout: Option<Duration>,
    profile: FingerprintProfile,
    ui: Arc<dyn UiSink>,
    in_flight: AtomicBool,
}

impl Submitter {
    pub fn new(
        service_url: impl Into<String>,
        download_dir: impl Into<PathBuf>,
        ui: Arc<dyn UiSink>,
    ) -> Self {
        Self {
            service_url: service_url.into(),
            download_dir: download_dir.into(),
            quality: None,
            timeout: None,
            profile: FingerprintProfile::default(),
            ui,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_quality(mut self, quality: Option<u32>) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_profile(mut self, profile: FingerprintProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Single entry point for one submission attempt.
    pub async fn submit(&self, raw_input: &str) -> Outcome {
        let input = raw_input.trim();
        if input.is_empty() {
            self.ui.shake();
            return Outcome::EmptyInput;
        }
        if !validate::is_supported_url(input) {
            self.ui.notify(Notice::error(INVALID_URL_MESSAGE));
            return Outcome::InvalidUrl;
        }

        // The swap doubles as the re-entrancy gate: whoever sees `false`
        // owns the submission until the guard drops.
        if self.in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!("submission ignored, another is in flight");
            return Outcome::Busy;
        }
        let guard = BusyGuard::engage(self.ui.as_ref(), &self.in_flight);

        let request = ConvertRequest {
            url: input.to_string(),
            quality: self.quality,
            headers: self.profile.collect(),
        };
        tracing::info!(url = %request.url, "submitting conversion request");

        let service_url = self.service_url.clone();
        let timeout = self.timeout;
        let response = tokio::task::spawn_blocking(move || {
            convert::post_convert(&service_url, &request, timeout)
        })
        .await
        .map_err(|e| SubmitError::Network(e.to_string()))
        .and_then(|r| r.map_err(|e| SubmitError::Network(e.to_string())));

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("conversion request failed: {e}");
                self.ui.notify(Notice::error(RETRY_MESSAGE));
                return Outcome::Failed(e);
            }
        };

        if let Some(message) = response.error.filter(|m| !m.is_empty()) {
            self.ui.notify(Notice::error(format!("Error: {message}")));
            return Outcome::Failed(SubmitError::Server(message));
        }
        let Some(download_url) = response.download_url else {
            self.ui.notify(Notice::error(RETRY_MESSAGE));
            return Outcome::Failed(SubmitError::Network(
                "conversion response carried neither an error nor a download link".to_string(),
            ));
        };

        // Succeeded: the control comes back before the fetch, which proceeds
        // like the fired-off anchor click it replaces.
        let cached = response.cached.unwrap_or(false);
        self.ui
            .notify(Notice::success(success_wording(cached, response.title.as_deref())));
        drop(guard);

        let file = match self.fetch(&download_url, response.title.as_deref()).await {
            Ok(f) => Some(f),
            Err(e) => {
                tracing::warn!("download fetch failed: {e}");
                None
            }
        };
        Outcome::Converted { file, cached }
    }

    async fn fetch(
        &self,
        download_url: &str,
        title: Option<&str>,
    ) -> Result<FetchedFile, download::FetchError> {
        let resolved = download::resolve_download_url(&self.service_url, download_url)?;
        let dir = self.download_dir.clone();
        let title = title.map(str::to_string);
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || {
            download::fetch_to_dir(&resolved, &dir, title.as_deref(), timeout)
        })
        .await
        .map_err(|e| download::FetchError::Io(std::io::Error::other(e.to_string())))?
    }
}

/// Restores the submit control and clears the in-flight flag when dropped,
/// so the restore runs on every exit path, including panics.
struct BusyGuard<'a> {
    ui: &'a dyn UiSink,
    in_flight: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn engage(ui: &'a dyn UiSink, in_flight: &'a AtomicBool) -> Self {
        ui.set_busy(true);
        Self { ui, in_flight }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.ui.set_busy(false);
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

fn success_wording(cached: bool, title: Option<&str>) -> String {
    match (cached, title) {
        (true, Some(t)) => format!("Already converted: \"{t}\". Starting download."),
        (true, None) => "Already converted. Starting download.".to_string(),
        (false, Some(t)) => format!("Converted \"{t}\". Starting download."),
        (false, None) => "Conversion complete. Starting download.".to_string(),
    }
}
