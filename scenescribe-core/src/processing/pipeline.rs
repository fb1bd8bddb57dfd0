// ============================================================================
// scenescribe-core/src/processing/pipeline.rs
// ============================================================================
//
// PIPELINE DRIVER: Main Per-Video Orchestration
//
// Coordinates the whole workflow for each video: probing, the concurrent
// chapter/visual segmentation stages, timeline alignment, contextualization,
// artifact persistence and the run summary.
//
// WORKFLOW per video:
//   1. Probe stream metadata (duration, frame rate, resolution)
//   2. In parallel (join point before alignment):
//      a. Transcribe and segment the transcript into chapters
//      b. Extract frames, embed them (bounded fan-out), group into
//         shots and scenes
//   3. Align the chapter and scene timelines
//   4. Contextualize each aligned scene into a SceneDocument
//   5. Persist scene documents plus the timeline artifact
//
// Videos in a run are independent: they are processed in parallel, each
// yielding its own outcome, and one video's failure never aborts its
// siblings. The retry policy is applied uniformly around every collaborator
// call; cancellation propagates to all stages of the run.

use crate::cancel::CancellationToken;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{
    FrameEmbedder, FrameExtractor, SampledFrame, SceneNarrator, StreamInfo, StreamProber,
    Transcriber,
};
use crate::notifications::Notifier;
use crate::processing::alignment::{align_scenes, AlignedChapter};
use crate::processing::chapters::{segment_chapters, ChapterSegment};
use crate::processing::context::{contextualize_scenes, write_scene_documents};
use crate::processing::cost::{estimate_transcription_cost, CostAccountant, CostStage};
use crate::processing::visual::{build_visual_timeline, Frame, VisualTimeline};
use crate::utils::{format_cost, format_timestamp_ms, get_file_stem_safe, get_filename_safe};

use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Per-video statistics for a successfully processed video.
#[derive(Debug, Clone)]
pub struct VideoReport {
    pub video_name: String,
    pub duration_ms: u64,
    pub chapter_count: usize,
    pub scene_count: usize,
    pub shot_count: usize,
    pub frame_count: usize,
    pub document_count: usize,
    pub skipped_scenes: usize,
    pub estimated_cost: f64,
    pub elapsed: Duration,
}

/// Independent outcome for one video of the run.
#[derive(Debug)]
pub struct VideoOutcome {
    pub video_name: String,
    pub result: CoreResult<VideoReport>,
}

/// Aggregated result of one run.
#[derive(Debug)]
pub struct RunSummary {
    pub outcomes: Vec<VideoOutcome>,
    pub total_estimated_cost: f64,
}

impl RunSummary {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Human-readable per-video summary for logs and notifications.
    #[must_use]
    pub fn format(&self) -> String {
        let mut out = String::new();
        for outcome in &self.outcomes {
            match &outcome.result {
                Ok(report) => {
                    out.push_str(&format!(
                        "{}: {} chapters, {} scenes, {} documents ({} skipped), cost {}\n",
                        report.video_name,
                        report.chapter_count,
                        report.scene_count,
                        report.document_count,
                        report.skipped_scenes,
                        format_cost(report.estimated_cost),
                    ));
                }
                Err(err) => {
                    out.push_str(&format!("{}: FAILED ({err})\n", outcome.video_name));
                }
            }
        }
        out.push_str(&format!(
            "Run total: {}/{} videos succeeded, estimated cost {}",
            self.succeeded(),
            self.outcomes.len(),
            format_cost(self.total_estimated_cost),
        ));
        out
    }
}

/// Processes a list of video files according to the provided configuration.
///
/// This is the main entry point for the scenescribe-core library. Videos are
/// processed in parallel and independently: the returned summary carries one
/// outcome per input file, never an all-or-nothing failure.
///
/// The function is generic over the collaborator traits so substitutes can be
/// injected for testing:
/// - `P`: StreamProber, `X`: FrameExtractor (local media tools)
/// - `T`: Transcriber, `E`: FrameEmbedder, `N`: SceneNarrator (model services)
/// - `O`: Notifier (optional run-completion notification)
#[allow(clippy::too_many_arguments)]
pub fn process_videos<P, X, T, E, N, O>(
    prober: &P,
    extractor: &X,
    transcriber: &T,
    embedder: &E,
    narrator: &N,
    notifier: Option<&O>,
    config: &CoreConfig,
    files_to_process: &[PathBuf],
    accountant: &CostAccountant,
    cancel: &CancellationToken,
) -> CoreResult<RunSummary>
where
    P: StreamProber + Sync,
    X: FrameExtractor + Sync,
    T: Transcriber + ?Sized,
    E: FrameEmbedder + ?Sized,
    N: SceneNarrator + ?Sized,
    O: Notifier + ?Sized,
{
    config.validate()?;
    std::fs::create_dir_all(&config.output_dir)?;

    log::info!("Processing {} video file(s)", files_to_process.len());

    let outcomes: Vec<VideoOutcome> = files_to_process
        .par_iter()
        .map(|input_path| {
            let video_name = get_filename_safe(input_path)
                .unwrap_or_else(|_| input_path.display().to_string());
            let result = process_single_video(
                prober, extractor, transcriber, embedder, narrator, config, input_path,
                accountant, cancel,
            );
            if let Err(err) = &result {
                log::error!("Processing failed for {video_name}: {err}");
            }
            VideoOutcome { video_name, result }
        })
        .collect();

    let summary = RunSummary {
        total_estimated_cost: accountant.run_total(),
        outcomes,
    };

    if let (Some(notifier), Some(topic)) = (notifier, config.ntfy_topic.as_deref()) {
        let title = format!(
            "Scenescribe run complete: {}/{} videos",
            summary.succeeded(),
            summary.outcomes.len()
        );
        if let Err(err) = notifier.send(topic, &summary.format(), Some(&title), Some(3)) {
            log::warn!("Failed to send run-completion notification: {err}");
        }
    }

    Ok(summary)
}

/// Runs the full pipeline for one video.
#[allow(clippy::too_many_arguments)]
fn process_single_video<P, X, T, E, N>(
    prober: &P,
    extractor: &X,
    transcriber: &T,
    embedder: &E,
    narrator: &N,
    config: &CoreConfig,
    input_path: &Path,
    accountant: &CostAccountant,
    cancel: &CancellationToken,
) -> CoreResult<VideoReport>
where
    P: StreamProber,
    // The extractor reference crosses into the visual half of the
    // chapter/visual join, so it must be shareable.
    X: FrameExtractor + Sync,
    T: Transcriber + ?Sized,
    E: FrameEmbedder + ?Sized,
    N: SceneNarrator + ?Sized,
{
    let start_time = Instant::now();
    cancel.check()?;

    let video_name = get_filename_safe(input_path)?;
    let video_stem = get_file_stem_safe(input_path)?;
    let work_dir = config.output_dir.join(&video_stem);
    let frames_dir = work_dir.join("frames");
    let docs_dir = work_dir.join("scene_documents");
    std::fs::create_dir_all(&work_dir)?;

    // ---- Stage 1: Stream probing ----
    let stream_info = prober.probe(input_path)?;
    log::info!(
        "{video_name}: {} @ {:.2} fps, {}x{}",
        format_timestamp_ms(stream_info.duration_ms),
        stream_info.frame_rate,
        stream_info.width,
        stream_info.height
    );
    cancel.check()?;

    // Bounded pool for collaborator fan-out within this video.
    let call_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_concurrent_calls)
        .build()
        .map_err(|e| CoreError::Config(format!("failed to build collaborator pool: {e}")))?;

    // ---- Stage 2: Chapter and visual segmentation (independent; the join
    // point before alignment) ----
    let (chapters_result, timeline_result) = rayon::join(
        || {
            chapter_stage(
                transcriber,
                config,
                input_path,
                &video_name,
                stream_info.duration_ms,
                accountant,
                cancel,
            )
        },
        || {
            visual_stage(
                extractor, embedder, config, input_path, &video_name, &stream_info, &frames_dir,
                &call_pool, accountant, cancel,
            )
        },
    );
    let chapters = chapters_result?;
    let timeline = timeline_result?;
    cancel.check()?;

    // ---- Stage 3: Timeline alignment ----
    let aligned = align_scenes(&chapters, &timeline.scenes);

    // ---- Stage 4: Contextualization ----
    let outcome = contextualize_scenes(
        narrator,
        &timeline,
        &aligned,
        &video_name,
        config,
        &call_pool,
        cancel,
        accountant,
    )?;

    // ---- Stage 5: Persistence ----
    write_timeline_artifact(&work_dir, &video_name, &stream_info, &aligned, &timeline)?;
    write_scene_documents(&outcome.documents, &video_stem, &docs_dir)?;

    let report = VideoReport {
        video_name: video_name.clone(),
        duration_ms: stream_info.duration_ms,
        chapter_count: chapters.len(),
        scene_count: timeline.scenes.len(),
        shot_count: timeline.shots.len(),
        frame_count: timeline.frames.len(),
        document_count: outcome.documents.len(),
        skipped_scenes: outcome.skipped_scenes,
        estimated_cost: accountant.video_total(&video_name),
        elapsed: start_time.elapsed(),
    };
    log::info!(
        "{video_name}: {} chapters, {} scenes, {} documents ({} skipped) in {:.1?}",
        report.chapter_count,
        report.scene_count,
        report.document_count,
        report.skipped_scenes,
        report.elapsed
    );
    Ok(report)
}

/// Transcribes the video (with retry) and segments the turns into chapters.
fn chapter_stage<T: Transcriber + ?Sized>(
    transcriber: &T,
    config: &CoreConfig,
    input_path: &Path,
    video_name: &str,
    duration_ms: u64,
    accountant: &CostAccountant,
    cancel: &CancellationToken,
) -> CoreResult<Vec<ChapterSegment>> {
    let transcription = config
        .retry_policy
        .run(cancel, || transcriber.transcribe(input_path))?;

    // Collaborators that omit a cost are estimated from media duration at the
    // published per-minute rate.
    let transcription_cost = transcription
        .estimated_cost
        .or_else(|| Some(estimate_transcription_cost(duration_ms)));
    accountant.record(video_name, CostStage::Transcription, transcription_cost);

    let chapters = segment_chapters(&transcription.turns, duration_ms, config)?;
    // Discourse analysis runs locally; it incurs no collaborator cost.
    accountant.record(video_name, CostStage::ChapterAnalysis, Some(0.0));

    log::info!(
        "{video_name}: {} transcript turns -> {} chapters",
        transcription.turns.len(),
        chapters.len()
    );
    Ok(chapters)
}

/// Extracts frames, embeds them with bounded parallel fan-out, and groups
/// them into shots and scenes.
#[allow(clippy::too_many_arguments)]
fn visual_stage<X: FrameExtractor, E: FrameEmbedder + ?Sized>(
    extractor: &X,
    embedder: &E,
    config: &CoreConfig,
    input_path: &Path,
    video_name: &str,
    stream_info: &StreamInfo,
    frames_dir: &Path,
    pool: &rayon::ThreadPool,
    accountant: &CostAccountant,
    cancel: &CancellationToken,
) -> CoreResult<VisualTimeline> {
    cancel.check()?;
    let sampled = extractor.extract_frames(
        input_path,
        stream_info,
        config.frame_interval_ms,
        config.frame_size,
        frames_dir,
    )?;
    log::info!("{video_name}: extracted {} frames", sampled.len());

    let frames = embed_frames(embedder, &sampled, config, video_name, pool, accountant, cancel)?;

    // Grouping is a sequential scan in timestamp order; it runs only after
    // every embedding for the video is available.
    build_visual_timeline(frames, stream_info.duration_ms, config)
}

/// Embeds all sampled frames on the bounded pool, preserving timestamp order.
fn embed_frames<E: FrameEmbedder + ?Sized>(
    embedder: &E,
    sampled: &[SampledFrame],
    config: &CoreConfig,
    video_name: &str,
    pool: &rayon::ThreadPool,
    accountant: &CostAccountant,
    cancel: &CancellationToken,
) -> CoreResult<Vec<Frame>> {
    let outputs: CoreResult<Vec<_>> = pool.install(|| {
        sampled
            .par_iter()
            .map(|frame| {
                config
                    .retry_policy
                    .run(cancel, || embedder.embed_frame(&frame.path))
            })
            .collect()
    });
    let outputs = outputs?;

    let mut known_cost = 0.0f64;
    let mut reported = false;
    let frames: Vec<Frame> = sampled
        .iter()
        .zip(outputs)
        .map(|(sampled_frame, output)| {
            if let Some(cost) = output.estimated_cost {
                known_cost += cost;
                reported = true;
            }
            Frame {
                timestamp_ms: sampled_frame.timestamp_ms,
                image_path: sampled_frame.path.clone(),
                embedding: output.vector,
            }
        })
        .collect();

    accountant.record(
        video_name,
        CostStage::Embedding,
        reported.then_some(known_cost),
    );
    Ok(frames)
}

/// Persisted aligned-timeline artifact for one video.
#[derive(Debug, Serialize)]
struct TimelineArtifact<'a> {
    video_name: &'a str,
    stream_info: &'a StreamInfo,
    chapters: &'a [AlignedChapter],
    timeline: &'a VisualTimeline,
}

/// Writes `timeline.json` into the video's work directory.
fn write_timeline_artifact(
    work_dir: &Path,
    video_name: &str,
    stream_info: &StreamInfo,
    aligned: &[AlignedChapter],
    timeline: &VisualTimeline,
) -> CoreResult<()> {
    let artifact = TimelineArtifact {
        video_name,
        stream_info,
        chapters: aligned,
        timeline,
    };
    let path = work_dir.join("timeline.json");
    std::fs::write(&path, serde_json::to_string_pretty(&artifact)?)?;
    log::debug!("Wrote timeline artifact to {}", path.display());
    Ok(())
}
