// ============================================================================
// scenescribe-core/src/processing/context.rs
// ============================================================================
//
// CONTEXTUALIZER: Aligned Scenes -> Scene Documents
//
// For each scene of an aligned chapter, selects a bounded set of
// representative frames and asks the vision-language collaborator for a
// natural-language description combining the frames with the owning
// chapter's transcript text. Produces one SceneDocument per scene.
//
// Per-scene calls are independent: a failed or stalled contextualization
// call is logged and skipped without invalidating sibling scenes' documents
// (partial-failure isolation). Documents are immutable once written; a
// re-run produces a new generation of files, never in-place updates.

use crate::cancel::CancellationToken;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::SceneNarrator;
use crate::processing::alignment::AlignedChapter;
use crate::processing::cost::{CostAccountant, CostStage};
use crate::processing::visual::VisualTimeline;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The pipeline's terminal artifact: one retrievable document per scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub video_name: String,
    pub chapter_index: usize,
    pub scene_index: usize,
    pub chapter_text: String,
    pub scene_start_ms: u64,
    pub scene_end_ms: u64,
    pub representative_frames: Vec<PathBuf>,
    pub contextual_description: String,
    /// Stable external key (`{video}#{start_ms}-{end_ms}`) for citation and
    /// playback.
    pub source_attribution: String,
}

/// Result of contextualizing one video's aligned timeline.
#[derive(Debug, Default)]
pub struct ContextualizationOutcome {
    /// Documents in scene order; skipped scenes are absent.
    pub documents: Vec<SceneDocument>,
    /// Number of scenes whose contextualization failed and were omitted.
    pub skipped_scenes: usize,
}

/// Picks up to `max` representative frame indices for a scene, evenly spaced
/// across its frame range (the first/middle/last generalization). The
/// selection is deterministic.
#[must_use]
pub fn select_representative_frames(
    timeline: &VisualTimeline,
    scene_index: usize,
    max: usize,
) -> Vec<usize> {
    let range = timeline.scene_frame_range(&timeline.scenes[scene_index]);
    let count = range.len();
    if count == 0 || max == 0 {
        return Vec::new();
    }
    if count <= max {
        return range.collect();
    }

    let mut indices: Vec<usize> = (0..max)
        .map(|i| range.start + (i * (count - 1)) / (max - 1).max(1))
        .collect();
    indices.dedup();
    indices
}

/// Generates a SceneDocument for every scene of every aligned chapter,
/// issuing collaborator calls concurrently on the provided bounded pool.
#[allow(clippy::too_many_arguments)]
pub fn contextualize_scenes<N: SceneNarrator + ?Sized>(
    narrator: &N,
    timeline: &VisualTimeline,
    aligned: &[AlignedChapter],
    video_name: &str,
    config: &CoreConfig,
    pool: &rayon::ThreadPool,
    cancel: &CancellationToken,
    accountant: &CostAccountant,
) -> CoreResult<ContextualizationOutcome> {
    cancel.check()?;

    // Flatten to (chapter_index, scene_index) tasks in scene order.
    let tasks: Vec<(usize, usize)> = aligned
        .iter()
        .enumerate()
        .flat_map(|(chapter_index, chapter)| {
            chapter
                .scenes
                .iter()
                .map(move |&scene_index| (chapter_index, scene_index))
        })
        .collect();

    let results: Vec<Option<SceneDocument>> = pool.install(|| {
        tasks
            .par_iter()
            .map(|&(chapter_index, scene_index)| {
                contextualize_one_scene(
                    narrator,
                    timeline,
                    aligned,
                    chapter_index,
                    scene_index,
                    video_name,
                    config,
                    cancel,
                    accountant,
                )
            })
            .collect()
    });

    cancel.check()?;

    let mut outcome = ContextualizationOutcome::default();
    for document in results {
        match document {
            Some(document) => outcome.documents.push(document),
            None => outcome.skipped_scenes += 1,
        }
    }
    outcome
        .documents
        .sort_by_key(|d| (d.scene_start_ms, d.scene_index));

    log::info!(
        "Contextualization for {}: {} documents, {} skipped",
        video_name,
        outcome.documents.len(),
        outcome.skipped_scenes
    );
    Ok(outcome)
}

/// One scene's contextualization call with retry; returns `None` on failure
/// so siblings proceed.
#[allow(clippy::too_many_arguments)]
fn contextualize_one_scene<N: SceneNarrator + ?Sized>(
    narrator: &N,
    timeline: &VisualTimeline,
    aligned: &[AlignedChapter],
    chapter_index: usize,
    scene_index: usize,
    video_name: &str,
    config: &CoreConfig,
    cancel: &CancellationToken,
    accountant: &CostAccountant,
) -> Option<SceneDocument> {
    let scene = &timeline.scenes[scene_index];
    let chapter_text = aligned[chapter_index].chapter.text.clone();

    let frame_indices =
        select_representative_frames(timeline, scene_index, config.max_representative_frames);
    let frame_paths: Vec<PathBuf> = frame_indices
        .iter()
        .map(|&i| timeline.frames[i].image_path.clone())
        .collect();

    let narration = config
        .retry_policy
        .run(cancel, || narrator.describe_scene(&frame_paths, &chapter_text));

    match narration {
        Ok(narration) => {
            accountant.record(
                video_name,
                CostStage::Contextualization,
                narration.estimated_cost,
            );
            Some(SceneDocument {
                video_name: video_name.to_string(),
                chapter_index,
                scene_index,
                chapter_text,
                scene_start_ms: scene.start_ms,
                scene_end_ms: scene.end_ms,
                representative_frames: frame_paths,
                contextual_description: narration.description,
                source_attribution: format!(
                    "{video_name}#{}-{}",
                    scene.start_ms, scene.end_ms
                ),
            })
        }
        Err(CoreError::Cancelled) => None,
        Err(err) => {
            log::warn!(
                "Contextualization failed for scene {}..{} of {video_name}; skipping: {err}",
                scene.start_ms,
                scene.end_ms
            );
            None
        }
    }
}

/// Metadata sidecar written next to each scene document, usable as a stable
/// external key by the ingestion collaborator.
#[derive(Debug, Serialize)]
struct DocumentMetadata<'a> {
    #[serde(rename = "metadataAttributes")]
    metadata_attributes: MetadataAttributes<'a>,
}

#[derive(Debug, Serialize)]
struct MetadataAttributes<'a> {
    video: &'a str,
    filename: &'a str,
    start_ms: u64,
    end_ms: u64,
}

/// Filename for a scene document: `{stem}-{chapter:02}-{scene:03}.txt`.
#[must_use]
pub fn scene_document_filename(video_stem: &str, document: &SceneDocument) -> String {
    format!(
        "{video_stem}-{:02}-{:03}.txt",
        document.chapter_index, document.scene_index
    )
}

/// Writes each document plus its `.metadata.json` sidecar into
/// `scene_doc_dir`, returning the document paths.
pub fn write_scene_documents(
    documents: &[SceneDocument],
    video_stem: &str,
    scene_doc_dir: &Path,
) -> CoreResult<Vec<PathBuf>> {
    std::fs::create_dir_all(scene_doc_dir)?;

    let mut written = Vec::with_capacity(documents.len());
    for document in documents {
        let filename = scene_document_filename(video_stem, document);
        let doc_path = scene_doc_dir.join(&filename);

        let mut body = format!(
            "==== Chapter #{:02}, Scene #{:03}: Contextual information ====\n\n",
            document.chapter_index, document.scene_index
        );
        body.push_str("## Description\n");
        body.push_str(&document.contextual_description);
        body.push_str("\n\n## Transcript\n");
        if document.chapter_text.is_empty() {
            body.push_str("None\n");
        } else {
            body.push_str(&document.chapter_text);
            body.push('\n');
        }
        std::fs::write(&doc_path, body)?;

        let metadata = DocumentMetadata {
            metadata_attributes: MetadataAttributes {
                video: &document.video_name,
                filename: &filename,
                start_ms: document.scene_start_ms,
                end_ms: document.scene_end_ms,
            },
        };
        let metadata_path = scene_doc_dir.join(format!("{filename}.metadata.json"));
        std::fs::write(&metadata_path, serde_json::to_string_pretty(&metadata)?)?;

        written.push(doc_path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::visual::{Frame, Scene, Shot};

    fn timeline_with_frames(count: usize) -> VisualTimeline {
        let frames: Vec<Frame> = (0..count)
            .map(|i| Frame {
                timestamp_ms: i as u64 * 1000,
                image_path: PathBuf::from(format!("frames.{i}.jpg")),
                embedding: vec![1.0, 0.0],
            })
            .collect();
        let shots = vec![Shot {
            start_ms: 0,
            end_ms: count as u64 * 1000,
            frames: 0..count,
        }];
        let scenes = vec![Scene {
            start_ms: 0,
            end_ms: count as u64 * 1000,
            shots: 0..1,
        }];
        VisualTimeline {
            frames,
            shots,
            scenes,
        }
    }

    #[test]
    fn small_scenes_use_all_frames() {
        let timeline = timeline_with_frames(2);
        assert_eq!(select_representative_frames(&timeline, 0, 3), vec![0, 1]);
    }

    #[test]
    fn large_scenes_pick_first_middle_last() {
        let timeline = timeline_with_frames(11);
        assert_eq!(select_representative_frames(&timeline, 0, 3), vec![0, 5, 10]);
    }

    #[test]
    fn selection_is_deterministic_and_bounded() {
        let timeline = timeline_with_frames(100);
        let a = select_representative_frames(&timeline, 0, 5);
        let b = select_representative_frames(&timeline, 0, 5);
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
        assert_eq!(*a.first().unwrap(), 0);
        assert_eq!(*a.last().unwrap(), 99);
    }

    fn sample_document() -> SceneDocument {
        SceneDocument {
            video_name: "meridian.mp4".to_string(),
            chapter_index: 1,
            scene_index: 4,
            chapter_text: "A conversation on the pier.".to_string(),
            scene_start_ms: 30_000,
            scene_end_ms: 45_000,
            representative_frames: vec![PathBuf::from("frames.30.jpg")],
            contextual_description: "Two men talk under a storm.".to_string(),
            source_attribution: "meridian.mp4#30000-45000".to_string(),
        }
    }

    #[test]
    fn document_filename_format() {
        let document = sample_document();
        assert_eq!(
            scene_document_filename("meridian", &document),
            "meridian-01-004.txt"
        );
    }

    #[test]
    fn writes_document_and_metadata_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let document = sample_document();
        let written = write_scene_documents(&[document], "meridian", dir.path()).unwrap();
        assert_eq!(written.len(), 1);

        let body = std::fs::read_to_string(&written[0]).unwrap();
        assert!(body.contains("## Description"));
        assert!(body.contains("Two men talk under a storm."));
        assert!(body.contains("A conversation on the pier."));

        let metadata_path = dir.path().join("meridian-01-004.txt.metadata.json");
        let metadata: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(metadata_path).unwrap()).unwrap();
        assert_eq!(
            metadata["metadataAttributes"]["video"],
            serde_json::json!("meridian.mp4")
        );
        assert_eq!(
            metadata["metadataAttributes"]["start_ms"],
            serde_json::json!(30_000)
        );
        assert_eq!(
            metadata["metadataAttributes"]["end_ms"],
            serde_json::json!(45_000)
        );
    }
}
