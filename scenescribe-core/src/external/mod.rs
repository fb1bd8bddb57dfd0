// ============================================================================
// scenescribe-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL COLLABORATORS: Interactions with External Tools and Services
//
// This module encapsulates every external dependency of the pipeline: the
// ffprobe/ffmpeg media tools and the three model services (transcription,
// frame embedding, contextualization). Each collaborator is abstracted behind
// a trait with a concrete implementation, following the dependency-injection
// pattern so the pipeline can be exercised with substitute collaborators in
// tests.
//
// Connection settings are passed explicitly per adapter (CollaboratorConfig);
// adapters hold no shared or ambient session state.

use crate::config::CollaboratorConfig;
use crate::error::{CoreError, CoreResult};

/// Stream metadata probing (ffprobe)
pub mod ffprobe_executor;

/// Frame sampling (ffmpeg)
pub mod frame_extractor;

/// Transcription service adapter
pub mod transcription;

/// Frame-embedding service adapter
pub mod embedding;

/// Vision-language contextualization service adapter
pub mod contextual;

// ----- Re-exports -----
pub use contextual::{HttpSceneNarrator, SceneNarration, SceneNarrator};
pub use embedding::{EmbeddingOutput, FrameEmbedder, HttpFrameEmbedder};
pub use ffprobe_executor::{CrateFfprobeExecutor, StreamInfo, StreamProber};
pub use frame_extractor::{FrameExtractor, SampledFrame, SidecarFrameExtractor};
pub use transcription::{HttpTranscriber, Transcriber, TranscriptTurn, TranscriptionOutput};

/// Builds a blocking HTTP client honoring the collaborator's per-call
/// timeout.
pub(crate) fn build_blocking_client(
    collaborator: &str,
    config: &CollaboratorConfig,
) -> CoreResult<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| CoreError::CollaboratorFailure {
            collaborator: collaborator.to_string(),
            message: format!("failed to build HTTP client: {e}"),
        })
}

/// Maps a reqwest error to the collaborator error kinds: timeouts become
/// `CollaboratorTimeout`, everything else `CollaboratorFailure`. Both are
/// transient and subject to the pipeline's retry policy.
pub(crate) fn map_reqwest_error(collaborator: &str, err: reqwest::Error) -> CoreError {
    if err.is_timeout() {
        CoreError::CollaboratorTimeout {
            collaborator: collaborator.to_string(),
        }
    } else {
        CoreError::CollaboratorFailure {
            collaborator: collaborator.to_string(),
            message: err.to_string(),
        }
    }
}
