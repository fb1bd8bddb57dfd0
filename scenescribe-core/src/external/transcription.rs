//! Transcription collaborator interface and HTTP adapter.
//!
//! The transcription service accepts a media file and returns ordered speech
//! turns plus a cost estimate. The core only consumes the turns; how the
//! service computes them is outside this crate.

use crate::config::CollaboratorConfig;
use crate::error::CoreResult;
use crate::external::{build_blocking_client, map_reqwest_error};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// One speech turn from the transcription collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

/// Full transcription result for one video.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptionOutput {
    pub turns: Vec<TranscriptTurn>,
    /// Estimated service cost in dollars; `None` when the service did not
    /// report one (counted as zero with a logged gap by the cost accountant).
    #[serde(default)]
    pub estimated_cost: Option<f64>,
}

/// Trait for the transcription collaborator.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, input_path: &Path) -> CoreResult<TranscriptionOutput>;
}

/// HTTP implementation of `Transcriber` posting the media bytes to a
/// configured endpoint.
pub struct HttpTranscriber {
    config: CollaboratorConfig,
    client: reqwest::blocking::Client,
}

impl HttpTranscriber {
    pub fn new(config: CollaboratorConfig) -> CoreResult<Self> {
        let client = build_blocking_client("transcription", &config)?;
        Ok(Self { config, client })
    }
}

impl Transcriber for HttpTranscriber {
    fn transcribe(&self, input_path: &Path) -> CoreResult<TranscriptionOutput> {
        log::debug!(
            "Requesting transcription for {} from {}",
            input_path.display(),
            self.config.endpoint
        );
        let media = std::fs::read(input_path)?;

        let mut request = self
            .client
            .post(&self.config.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(media);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| map_reqwest_error("transcription", e))?;

        response
            .json::<TranscriptionOutput>()
            .map_err(|e| map_reqwest_error("transcription", e))
    }
}
