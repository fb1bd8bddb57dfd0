// ============================================================================
// scenescribe-core/src/processing/visual.rs
// ============================================================================
//
// VISUAL SEGMENTER: Frames -> Shots -> Scenes
//
// Groups sampled frames into shots (visual continuity: the cosine distance
// between consecutive frame embeddings stays under a threshold) and shots
// into scenes (visual discontinuity: a shot's embedding centroid diverges
// from the centroids of the preceding shots in a sliding window).
//
// The grouping is a sequential scan over the embedding sequence in timestamp
// order; for a fixed frame sample and fixed thresholds the boundaries are
// fully reproducible. Shots partition the video contiguously and scenes
// partition the shots, so scenes cover the whole timeline without overlap.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::PathBuf;

/// One sampled frame with its embedding and image location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub timestamp_ms: u64,
    pub image_path: PathBuf,
    /// Fixed-dimension embedding vector. Not persisted with the timeline
    /// artifact; the image path is the durable reference.
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

/// A maximal run of visually continuous frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shot {
    pub start_ms: u64,
    pub end_ms: u64,
    /// Indices into the frame list covered by this shot.
    pub frames: Range<usize>,
}

/// A visually coherent segment composed of one or more shots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub start_ms: u64,
    pub end_ms: u64,
    /// Indices into the shot list covered by this scene.
    pub shots: Range<usize>,
}

impl Scene {
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// The complete visual timeline of one video: frames, shots and scenes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualTimeline {
    pub frames: Vec<Frame>,
    pub shots: Vec<Shot>,
    pub scenes: Vec<Scene>,
}

impl VisualTimeline {
    /// Frame index range covered by the given scene.
    #[must_use]
    pub fn scene_frame_range(&self, scene: &Scene) -> Range<usize> {
        let first = self.shots[scene.shots.start].frames.start;
        let last = self.shots[scene.shots.end - 1].frames.end;
        first..last
    }
}

/// Builds the shot/scene structure from embedded frames.
///
/// `frames` must be ordered by timestamp (the extractor guarantees this).
/// A video shorter than the minimum shot duration yields exactly one shot and
/// one scene spanning the whole video.
pub fn build_visual_timeline(
    frames: Vec<Frame>,
    duration_ms: u64,
    config: &CoreConfig,
) -> CoreResult<VisualTimeline> {
    if frames.is_empty() {
        return Err(CoreError::FrameExtraction(
            "cannot build a visual timeline from zero frames".to_string(),
        ));
    }

    let dimension = frames[0].embedding.len();
    if dimension == 0 {
        return Err(CoreError::CollaboratorFailure {
            collaborator: "embedding".to_string(),
            message: "empty embedding vector".to_string(),
        });
    }
    if let Some(bad) = frames.iter().find(|f| f.embedding.len() != dimension) {
        return Err(CoreError::CollaboratorFailure {
            collaborator: "embedding".to_string(),
            message: format!(
                "inconsistent embedding dimension: expected {dimension}, got {} at {} ms",
                bad.embedding.len(),
                bad.timestamp_ms
            ),
        });
    }

    let shots = group_frames_into_shots(
        &frames,
        duration_ms,
        config.shot_boundary_threshold,
        config.min_shot_duration_ms,
    );
    let scenes = group_shots_into_scenes(
        &frames,
        &shots,
        config.scene_boundary_threshold,
        config.scene_window,
    );

    log::info!(
        "Visual segmentation: {} frames -> {} shots -> {} scenes",
        frames.len(),
        shots.len(),
        scenes.len()
    );

    Ok(VisualTimeline {
        frames,
        shots,
        scenes,
    })
}

/// Cosine distance between two vectors (0.0 identical direction, 2.0
/// opposite). Returns 1.0 when either vector has zero norm.
#[must_use]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Sequential scan declaring a shot boundary wherever the embedding distance
/// between consecutive frames exceeds the threshold. A cut arriving before
/// the current shot reaches the minimum duration is deferred: the boundary
/// is taken at the first frame where the shot is long enough, so a detected
/// cut is never lost, only postponed.
fn group_frames_into_shots(
    frames: &[Frame],
    duration_ms: u64,
    threshold: f32,
    min_shot_duration_ms: u64,
) -> Vec<Shot> {
    let mut boundaries: Vec<usize> = vec![0];
    let mut pending_cut = false;
    for i in 1..frames.len() {
        let distance = cosine_distance(&frames[i - 1].embedding, &frames[i].embedding);
        if distance > threshold {
            pending_cut = true;
        }
        let shot_start_ms = frames[boundaries[boundaries.len() - 1]].timestamp_ms;
        let long_enough = frames[i].timestamp_ms.saturating_sub(shot_start_ms)
            >= min_shot_duration_ms;
        if pending_cut && long_enough {
            boundaries.push(i);
            pending_cut = false;
        }
    }

    boundaries
        .iter()
        .enumerate()
        .map(|(n, &first)| {
            let next = boundaries.get(n + 1).copied().unwrap_or(frames.len());
            let end_ms = if next < frames.len() {
                frames[next].timestamp_ms
            } else {
                duration_ms.max(frames[first].timestamp_ms + 1)
            };
            Shot {
                start_ms: frames[first].timestamp_ms,
                end_ms,
                frames: first..next,
            }
        })
        .collect()
}

/// Mean embedding of a shot's frames.
fn shot_centroid(frames: &[Frame], shot: &Shot) -> Vec<f32> {
    let dimension = frames[shot.frames.start].embedding.len();
    let mut centroid = vec![0.0f32; dimension];
    let count = shot.frames.len() as f32;
    for frame in &frames[shot.frames.clone()] {
        for (c, v) in centroid.iter_mut().zip(frame.embedding.iter()) {
            *c += v;
        }
    }
    for c in &mut centroid {
        *c /= count;
    }
    centroid
}

/// Declares a scene boundary before a shot whose centroid's mean distance to
/// the preceding `window` shot centroids of the current scene exceeds the
/// threshold.
fn group_shots_into_scenes(
    frames: &[Frame],
    shots: &[Shot],
    threshold: f32,
    window: usize,
) -> Vec<Scene> {
    let centroids: Vec<Vec<f32>> = shots.iter().map(|s| shot_centroid(frames, s)).collect();

    let mut boundaries: Vec<usize> = vec![0];
    for i in 1..shots.len() {
        let scene_start = *boundaries.last().unwrap_or(&0);
        let window_start = i.saturating_sub(window).max(scene_start);
        let window_centroids = &centroids[window_start..i];
        let mean_distance = window_centroids
            .iter()
            .map(|c| cosine_distance(c, &centroids[i]))
            .sum::<f32>()
            / window_centroids.len() as f32;
        if mean_distance > threshold {
            boundaries.push(i);
        }
    }

    boundaries
        .iter()
        .enumerate()
        .map(|(n, &first)| {
            let next = boundaries.get(n + 1).copied().unwrap_or(shots.len());
            Scene {
                start_ms: shots[first].start_ms,
                end_ms: shots[next - 1].end_ms,
                shots: first..next,
            }
        })
        .collect()
}
