// scenescribe-core/tests/pipeline_partial_failure_tests.rs
//
// Failure-isolation integration tests: one scene's contextualization failure
// skips only that scene, and one video's malformed transcript fails only
// that video.

mod common;

use common::{
    MockFrameEmbedder, MockFrameExtractor, MockNotifier, MockSceneNarrator, MockStreamProber,
    MockTranscriber,
};
use scenescribe_core::external::{TranscriptTurn, TranscriptionOutput};
use scenescribe_core::processing::cost::CostAccountant;
use scenescribe_core::{process_videos, CancellationToken, CoreConfig, CoreError, RetryPolicy};

use std::path::Path;
use std::time::Duration;

fn fast_config(input_dir: &Path, output_dir: &Path) -> CoreConfig {
    let mut config = CoreConfig::new(input_dir.to_path_buf(), output_dir.to_path_buf());
    config.retry_policy = RetryPolicy::new(2, Duration::from_millis(1), Duration::from_millis(2));
    config
}

fn three_block_embedder() -> MockFrameEmbedder {
    MockFrameEmbedder {
        block_vectors: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, 0.0]],
        block_len: 4,
        cost_per_frame: Some(0.00006),
    }
}

fn simple_transcript() -> TranscriptionOutput {
    TranscriptionOutput {
        turns: vec![TranscriptTurn {
            start_ms: 0,
            end_ms: 11_500,
            text: "One long narration over the whole video.".to_string(),
            speaker: None,
        }],
        estimated_cost: Some(0.005),
    }
}

#[test]
fn one_failed_scene_skips_only_that_scene() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let config = fast_config(input_dir.path(), output_dir.path());

    let files = vec![input_dir.path().join("meridian.mp4")];
    let prober = MockStreamProber::with_duration_ms(12_000);
    let extractor = MockFrameExtractor { frame_count: 12 };
    let transcriber = MockTranscriber::with_response("meridian.mp4", simple_transcript());
    let embedder = three_block_embedder();
    // The first scene's representative frames include frames.0.jpg; no other
    // scene touches it.
    let narrator = MockSceneNarrator {
        fail_marker: Some("frames.0.jpg".to_string()),
        cost_per_scene: Some(0.01),
        calls: Default::default(),
    };

    let summary = process_videos(
        &prober,
        &extractor,
        &transcriber,
        &embedder,
        &narrator,
        None::<&MockNotifier>,
        &config,
        &files,
        &CostAccountant::new(),
        &CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(summary.succeeded(), 1);
    let report = summary.outcomes[0].result.as_ref().unwrap();
    assert_eq!(report.scene_count, 3);
    assert_eq!(report.document_count, 2);
    assert_eq!(report.skipped_scenes, 1);

    let docs_dir = output_dir.path().join("meridian").join("scene_documents");
    let txt_count = std::fs::read_dir(&docs_dir)
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .ends_with(".txt")
        })
        .count();
    assert_eq!(txt_count, 2);
}

#[test]
fn malformed_transcript_fails_only_that_video() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let config = fast_config(input_dir.path(), output_dir.path());

    let files = vec![
        input_dir.path().join("broken.mp4"),
        input_dir.path().join("fine.mp4"),
    ];

    let mut transcriber = MockTranscriber::default();
    // Non-monotonic turn order: must fail with MalformedTranscript, not be
    // silently reordered.
    transcriber.add_response(
        "broken.mp4",
        TranscriptionOutput {
            turns: vec![
                TranscriptTurn {
                    start_ms: 5_000,
                    end_ms: 8_000,
                    text: "later".to_string(),
                    speaker: None,
                },
                TranscriptTurn {
                    start_ms: 1_000,
                    end_ms: 2_000,
                    text: "earlier".to_string(),
                    speaker: None,
                },
            ],
            estimated_cost: None,
        },
    );
    transcriber.add_response("fine.mp4", simple_transcript());

    let narrator = MockSceneNarrator {
        fail_marker: None,
        cost_per_scene: Some(0.01),
        calls: Default::default(),
    };

    let summary = process_videos(
        &MockStreamProber::with_duration_ms(12_000),
        &MockFrameExtractor { frame_count: 12 },
        &transcriber,
        &three_block_embedder(),
        &narrator,
        None::<&MockNotifier>,
        &config,
        &files,
        &CostAccountant::new(),
        &CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(summary.outcomes.len(), 2);
    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.failed(), 1);

    assert_eq!(summary.outcomes[0].video_name, "broken.mp4");
    assert!(matches!(
        summary.outcomes[0].result,
        Err(CoreError::MalformedTranscript(_))
    ));

    let fine_report = summary.outcomes[1].result.as_ref().unwrap();
    assert_eq!(fine_report.document_count, 3);
    assert!(output_dir
        .path()
        .join("fine")
        .join("timeline.json")
        .is_file());
}

#[test]
fn transcriber_outage_exhausts_retries_then_fails_stage() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let config = fast_config(input_dir.path(), output_dir.path());

    // No scripted response: every transcribe call is a transient failure.
    let transcriber = MockTranscriber::default();
    let files = vec![input_dir.path().join("meridian.mp4")];

    let summary = process_videos(
        &MockStreamProber::with_duration_ms(12_000),
        &MockFrameExtractor { frame_count: 12 },
        &transcriber,
        &three_block_embedder(),
        &MockSceneNarrator::default(),
        None::<&MockNotifier>,
        &config,
        &files,
        &CostAccountant::new(),
        &CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(summary.failed(), 1);
    assert!(matches!(
        summary.outcomes[0].result,
        Err(CoreError::CollaboratorFailure { .. })
    ));
}
