//! Implementation of the 'process' subcommand.
//!
//! Handles file discovery, configuration setup, collaborator adapter wiring
//! and delegation to the scenescribe-core pipeline.

use crate::cli::ProcessArgs;
use crate::error::CliResult;
use crate::terminal;

use scenescribe_core::config::CollaboratorConfig;
use scenescribe_core::external::{
    CrateFfprobeExecutor, HttpFrameEmbedder, HttpSceneNarrator, HttpTranscriber,
    SidecarFrameExtractor,
};
use scenescribe_core::notifications::NtfyNotifier;
use scenescribe_core::processing::cost::CostAccountant;
use scenescribe_core::{
    format_cost, format_duration, process_videos, CancellationToken, CoreConfig, CoreError,
    RunSummary,
};

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

/// Discovers .mp4 files from the input path (file or directory). Returns
/// (files, effective_input_dir).
pub fn discover_process_files(args: &ProcessArgs) -> CliResult<(Vec<PathBuf>, PathBuf)> {
    let input_path = args.input_path.canonicalize().map_err(|e| {
        CoreError::PathError(format!(
            "Invalid input path '{}': {}",
            args.input_path.display(),
            e
        ))
    })?;

    let metadata = fs::metadata(&input_path).map_err(|e| {
        CoreError::PathError(format!(
            "Failed to access input path '{}': {}",
            input_path.display(),
            e
        ))
    })?;

    if metadata.is_dir() {
        match scenescribe_core::find_processable_files(&input_path) {
            Ok(files) => Ok((files, input_path.clone())),
            Err(CoreError::NoFilesFound) => Ok((Vec::new(), input_path.clone())),
            Err(e) => Err(e),
        }
    } else if metadata.is_file() {
        if input_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mp4"))
        {
            let parent_dir = input_path
                .parent()
                .ok_or_else(|| {
                    CoreError::PathError(format!(
                        "Could not determine parent directory for file '{}'",
                        input_path.display()
                    ))
                })?
                .to_path_buf();
            Ok((vec![input_path.clone()], parent_dir))
        } else {
            Err(CoreError::PathError(format!(
                "Input file '{}' is not a .mp4 file",
                input_path.display()
            )))
        }
    } else {
        Err(CoreError::PathError(format!(
            "Input path '{}' is neither a file nor a directory",
            input_path.display()
        )))
    }
}

/// Creates and configures CoreConfig from CLI arguments.
fn create_core_config(
    args: &ProcessArgs,
    effective_input_dir: PathBuf,
    output_dir: PathBuf,
) -> CliResult<CoreConfig> {
    let mut config = CoreConfig::new(effective_input_dir, output_dir);

    if let Some(interval) = args.frame_interval {
        config.frame_interval_ms = interval;
    }
    if let Some(threshold) = args.shot_threshold {
        config.shot_boundary_threshold = threshold;
    }
    if let Some(threshold) = args.scene_threshold {
        config.scene_boundary_threshold = threshold;
    }
    if let Some(pause) = args.pause_threshold {
        config.chapter_pause_threshold_ms = pause;
    }
    config.chapter_break_on_speaker_change = !args.no_speaker_breaks;

    if let Some(max_frames) = args.max_frames {
        config.max_representative_frames = max_frames;
    }
    if let Some(concurrency) = args.concurrency {
        config.max_concurrent_calls = concurrency;
    }
    if let Some(topic) = &args.ntfy {
        config.ntfy_topic = Some(topic.clone());
    }

    config.validate()?;
    Ok(config)
}

/// Builds the connection settings for one collaborator endpoint.
fn collaborator_config(args: &ProcessArgs, endpoint: &str) -> CollaboratorConfig {
    let mut config = CollaboratorConfig::new(endpoint);
    if let Some(secs) = args.call_timeout {
        config.timeout = Duration::from_secs(secs);
    }
    config.api_key = args.api_key.clone();
    config
}

/// Prints the per-video results and run totals.
fn display_results(summary: &RunSummary, total_start_time: Instant) {
    terminal::print_section("RUN COMPLETE");
    if summary.succeeded() > 0 {
        terminal::print_success(&format!(
            "Processed {} of {} video(s)",
            summary.succeeded(),
            summary.outcomes.len()
        ));
    }

    for outcome in &summary.outcomes {
        terminal::print_subsection(&outcome.video_name);
        match &outcome.result {
            Ok(report) => {
                terminal::print_status(
                    "Duration",
                    &scenescribe_core::format_timestamp_ms(report.duration_ms),
                    false,
                );
                terminal::print_status("Chapters", &report.chapter_count.to_string(), false);
                terminal::print_status(
                    "Scenes",
                    &format!("{} (from {} shots)", report.scene_count, report.shot_count),
                    false,
                );
                terminal::print_status(
                    "Documents",
                    &format!("{} ({} skipped)", report.document_count, report.skipped_scenes),
                    true,
                );
                terminal::print_status("Est. cost", &format_cost(report.estimated_cost), true);
                terminal::print_status(
                    "Time",
                    &format_duration(report.elapsed.as_secs_f64()),
                    false,
                );
            }
            Err(e) => {
                terminal::print_error(&format!("FAILED: {e}"));
            }
        }
    }

    terminal::print_section("Summary");
    terminal::print_status(
        "Videos",
        &format!("{}/{} succeeded", summary.succeeded(), summary.outcomes.len()),
        true,
    );
    terminal::print_status(
        "Est. cost",
        &format_cost(summary.total_estimated_cost),
        true,
    );
    terminal::print_status(
        "Total time",
        &format_duration(total_start_time.elapsed().as_secs_f64()),
        true,
    );
}

/// Runs the processing pipeline with the configured parameters and reports
/// results.
pub fn run_process(args: ProcessArgs) -> CliResult<()> {
    let total_start_time = Instant::now();

    let (files_to_process, effective_input_dir) = discover_process_files(&args)?;

    let output_dir = args.output_dir.clone();
    let log_dir = args
        .log_dir
        .clone()
        .unwrap_or_else(|| output_dir.join("logs"));
    fs::create_dir_all(&output_dir)?;
    fs::create_dir_all(&log_dir)?;

    terminal::print_section("INITIALIZATION");
    terminal::print_status("Input path", &args.input_path.display().to_string(), false);
    terminal::print_status("Output dir", &output_dir.display().to_string(), false);
    terminal::print_status("Videos", &files_to_process.len().to_string(), false);
    debug!("Run started: {}", chrono::Local::now());

    if files_to_process.is_empty() {
        warn!("No processable .mp4 files found in the specified input path.");
        return Ok(());
    }

    let config = create_core_config(&args, effective_input_dir, output_dir)?;

    // Concrete collaborator adapters for this run.
    let prober = CrateFfprobeExecutor::new();
    let extractor = SidecarFrameExtractor::new();
    let transcriber = HttpTranscriber::new(collaborator_config(&args, &args.transcribe_url))?;
    let embedder = HttpFrameEmbedder::new(collaborator_config(&args, &args.embed_url))?;
    let narrator = HttpSceneNarrator::new(collaborator_config(&args, &args.describe_url))?;
    let notifier = NtfyNotifier::new()?;

    // First Ctrl-C requests cooperative cancellation; in-flight collaborator
    // calls finish or time out, then each video reports Cancelled.
    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        warn!("Cancellation requested, finishing in-flight work");
        handler_token.cancel();
    }) {
        warn!("Failed to install Ctrl-C handler: {e}");
    }

    let accountant = CostAccountant::new();
    let summary = process_videos(
        &prober,
        &extractor,
        &transcriber,
        &embedder,
        &narrator,
        Some(&notifier),
        &config,
        &files_to_process,
        &accountant,
        &cancel,
    )?;

    display_results(&summary, total_start_time);

    // Persist the run summary alongside the outputs.
    let summary_path = log_dir.join(format!(
        "scenescribe_run_{}.log",
        crate::logging::get_timestamp()
    ));
    fs::write(&summary_path, summary.format())?;
    info!("Run summary written to {}", summary_path.display());

    if summary.succeeded() == 0 {
        return Err(CoreError::OperationFailed(
            "no videos were successfully processed".to_string(),
        ));
    }
    Ok(())
}
