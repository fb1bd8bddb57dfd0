// ============================================================================
// scenescribe-core/src/config.rs
// ============================================================================
//
// CONFIGURATION: Core Configuration Structures and Constants
//
// This module defines the configuration structures and constants used
// throughout the scenescribe-core library: input/output paths, segmentation
// thresholds, collaborator fan-out limits, and the retry policy applied to
// every collaborator call.
//
// Instances of CoreConfig are created by consumers of the library (like
// scenescribe-cli) and passed to the process_videos function. Collaborator
// endpoints are configured explicitly per adapter (CollaboratorConfig) and
// never read from ambient global state.

use crate::error::{CoreError, CoreResult};
use crate::retry::RetryPolicy;

use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// DEFAULT CONSTANTS
// ============================================================================

/// Default interval between sampled frames, in milliseconds (one frame per second).
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 1000;

/// Default thumbnail size for extracted frames (width, height).
/// Small enough to keep embedding-model payloads cheap while preserving
/// composition and on-screen text.
pub const DEFAULT_FRAME_SIZE: (u32, u32) = (392, 220);

/// Default cosine-distance threshold between consecutive frame embeddings
/// above which a shot boundary (hard cut) is declared.
pub const DEFAULT_SHOT_BOUNDARY_THRESHOLD: f32 = 0.45;

/// Default cosine-distance threshold for windowed shot-centroid dissimilarity
/// above which a scene boundary is declared.
pub const DEFAULT_SCENE_BOUNDARY_THRESHOLD: f32 = 0.30;

/// Default number of preceding shots considered when evaluating a scene
/// boundary.
pub const DEFAULT_SCENE_WINDOW: usize = 3;

/// Default minimum shot duration in milliseconds. Videos shorter than this
/// still produce exactly one shot and one scene.
pub const DEFAULT_MIN_SHOT_DURATION_MS: u64 = 1000;

/// Default inter-turn silence gap that starts a new chapter, in milliseconds.
pub const DEFAULT_CHAPTER_PAUSE_THRESHOLD_MS: u64 = 2000;

/// Default upper bound on representative frames sent per scene to the
/// contextualization collaborator.
pub const DEFAULT_MAX_REPRESENTATIVE_FRAMES: usize = 3;

/// Default cap on simultaneous outstanding collaborator calls per video.
pub const DEFAULT_MAX_CONCURRENT_CALLS: usize = 4;

/// Default per-call timeout for collaborator requests.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

// ============================================================================
// COLLABORATOR CONFIGURATION
// ============================================================================

/// Explicit connection settings for one external collaborator service.
///
/// Passed into each adapter at construction; there is no shared session or
/// cached client state between adapters.
#[derive(Debug, Clone)]
pub struct CollaboratorConfig {
    /// Service endpoint URL.
    pub endpoint: String,

    /// Per-call timeout applied by the adapter's HTTP client.
    pub timeout: Duration,

    /// Optional bearer token sent with each request.
    pub api_key: Option<String>,
}

impl CollaboratorConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_CALL_TIMEOUT,
            api_key: None,
        }
    }
}

// ============================================================================
// CORE CONFIGURATION
// ============================================================================

/// Main configuration structure for the scenescribe-core library.
///
/// Holds all parameters required for a pipeline run: paths, segmentation
/// thresholds, collaborator fan-out limits, and the retry policy. Typically
/// created by the consumer of the library (e.g. scenescribe-cli) and passed
/// to `process_videos`.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    // ---- Path Configuration ----
    /// Directory containing input video files to process.
    pub input_dir: PathBuf,

    /// Directory where per-video work directories and scene documents are
    /// written.
    pub output_dir: PathBuf,

    // ---- Frame Sampling ----
    /// Interval between sampled frames in milliseconds.
    pub frame_interval_ms: u64,

    /// Thumbnail size (width, height) for extracted frames.
    pub frame_size: (u32, u32),

    // ---- Visual Segmentation Thresholds ----
    /// Cosine-distance threshold for shot boundaries between consecutive
    /// frames.
    pub shot_boundary_threshold: f32,

    /// Cosine-distance threshold for scene boundaries between shot centroids.
    pub scene_boundary_threshold: f32,

    /// Number of preceding shots in the scene-boundary window.
    pub scene_window: usize,

    /// Minimum shot duration in milliseconds.
    pub min_shot_duration_ms: u64,

    // ---- Chapter Segmentation ----
    /// Inter-turn silence gap that starts a new chapter, in milliseconds.
    pub chapter_pause_threshold_ms: u64,

    /// Whether a speaker change also starts a new chapter.
    pub chapter_break_on_speaker_change: bool,

    // ---- Contextualization ----
    /// Upper bound on representative frames per scene.
    pub max_representative_frames: usize,

    // ---- Collaborator Fan-Out ----
    /// Cap on simultaneous outstanding collaborator calls per video.
    pub max_concurrent_calls: usize,

    /// Retry policy applied uniformly around every collaborator call.
    pub retry_policy: RetryPolicy,

    // ---- Notification Settings ----
    /// Optional ntfy.sh topic URL for the run-completion notification.
    pub ntfy_topic: Option<String>,
}

impl CoreConfig {
    /// Creates a configuration with default thresholds for the given paths.
    pub fn new(input_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_dir,
            output_dir,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            frame_size: DEFAULT_FRAME_SIZE,
            shot_boundary_threshold: DEFAULT_SHOT_BOUNDARY_THRESHOLD,
            scene_boundary_threshold: DEFAULT_SCENE_BOUNDARY_THRESHOLD,
            scene_window: DEFAULT_SCENE_WINDOW,
            min_shot_duration_ms: DEFAULT_MIN_SHOT_DURATION_MS,
            chapter_pause_threshold_ms: DEFAULT_CHAPTER_PAUSE_THRESHOLD_MS,
            chapter_break_on_speaker_change: true,
            max_representative_frames: DEFAULT_MAX_REPRESENTATIVE_FRAMES,
            max_concurrent_calls: DEFAULT_MAX_CONCURRENT_CALLS,
            retry_policy: RetryPolicy::default(),
            ntfy_topic: None,
        }
    }

    /// Validates the configuration, returning a `Config` error describing the
    /// first problem found.
    pub fn validate(&self) -> CoreResult<()> {
        if self.frame_interval_ms == 0 {
            return Err(CoreError::Config(
                "frame_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.shot_boundary_threshold) {
            return Err(CoreError::Config(format!(
                "shot_boundary_threshold {} outside valid cosine-distance range 0.0..=2.0",
                self.shot_boundary_threshold
            )));
        }
        if !(0.0..=2.0).contains(&self.scene_boundary_threshold) {
            return Err(CoreError::Config(format!(
                "scene_boundary_threshold {} outside valid cosine-distance range 0.0..=2.0",
                self.scene_boundary_threshold
            )));
        }
        if self.scene_window == 0 {
            return Err(CoreError::Config(
                "scene_window must be at least 1".to_string(),
            ));
        }
        if self.max_representative_frames == 0 {
            return Err(CoreError::Config(
                "max_representative_frames must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent_calls == 0 {
            return Err(CoreError::Config(
                "max_concurrent_calls must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
