// ============================================================================
// scenescribe-core/src/external/frame_extractor.rs
// ============================================================================
//
// FRAME EXTRACTION: FFmpeg-Based Frame Sampling
//
// This module extracts thumbnail frames from a video at a fixed interval
// using ffmpeg. Extraction is abstracted behind the FrameExtractor trait so
// the visual segmenter can be tested without a real ffmpeg binary.
//
// Frames are written as `frames.<n>.jpg` where `n * interval_ms` is the
// frame's timestamp; with the default one-second interval the index is the
// timestamp in whole seconds.

use crate::error::{CoreError, CoreResult};
use crate::external::ffprobe_executor::StreamInfo;

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::path::{Path, PathBuf};

/// One sampled frame on disk, tagged with its timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledFrame {
    /// Timestamp of the frame within the video, in milliseconds.
    pub timestamp_ms: u64,
    /// Path to the extracted JPEG image.
    pub path: PathBuf,
}

/// Trait for sampling frames from a video file.
pub trait FrameExtractor {
    /// Extracts frames at `interval_ms` spacing, scaled to `size`, into
    /// `output_dir`. Returns the frames ordered by timestamp.
    fn extract_frames(
        &self,
        input_path: &Path,
        stream_info: &StreamInfo,
        interval_ms: u64,
        size: (u32, u32),
        output_dir: &Path,
    ) -> CoreResult<Vec<SampledFrame>>;
}

/// Implementation of `FrameExtractor` using `ffmpeg-sidecar`.
#[derive(Debug, Default, Clone)]
pub struct SidecarFrameExtractor;

impl SidecarFrameExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FrameExtractor for SidecarFrameExtractor {
    fn extract_frames(
        &self,
        input_path: &Path,
        stream_info: &StreamInfo,
        interval_ms: u64,
        size: (u32, u32),
        output_dir: &Path,
    ) -> CoreResult<Vec<SampledFrame>> {
        std::fs::create_dir_all(output_dir)?;

        let (width, height) = size;
        let fps = 1000.0 / interval_ms as f64;
        let output_pattern = output_dir.join("frames.%d.jpg");

        log::debug!(
            "Extracting frames from {} at {:.3} fps ({}x{})",
            input_path.display(),
            fps,
            width,
            height
        );

        let mut cmd = FfmpegCommand::new();
        cmd.input(input_path.to_string_lossy());
        cmd.args(["-vf", &format!("fps={fps},scale={width}:{height}")]);
        cmd.args(["-start_number", "0"]);
        cmd.arg("-y");
        cmd.output(output_pattern.to_string_lossy());

        let mut child = cmd.spawn().map_err(|e| {
            CoreError::FrameExtraction(format!(
                "Failed to start ffmpeg for {}: {e}",
                input_path.display()
            ))
        })?;

        // Drain events so ffmpeg never blocks on a full pipe; surface only
        // error lines.
        if let Ok(iter) = child.iter() {
            for event in iter {
                if let FfmpegEvent::Error(line) = event {
                    log::warn!("ffmpeg: {line}");
                }
            }
        }

        let status = child.wait().map_err(|e| {
            CoreError::FrameExtraction(format!(
                "ffmpeg did not complete for {}: {e}",
                input_path.display()
            ))
        })?;
        if !status.success() {
            return Err(CoreError::FrameExtraction(format!(
                "ffmpeg exited with {status} for {}",
                input_path.display()
            )));
        }

        let frames = collect_extracted_frames(output_dir, interval_ms)?;
        if frames.is_empty() {
            return Err(CoreError::FrameExtraction(format!(
                "No frames produced for {} ({} ms)",
                input_path.display(),
                stream_info.duration_ms
            )));
        }
        Ok(frames)
    }
}

/// Collects `frames.<n>.jpg` files from `dir`, ordered by index, assigning
/// each the timestamp `n * interval_ms`.
pub(crate) fn collect_extracted_frames(
    dir: &Path,
    interval_ms: u64,
) -> CoreResult<Vec<SampledFrame>> {
    let mut indexed: Vec<(u64, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let index = parse_frame_index(path.file_name()?.to_str()?)?;
            Some((index, path))
        })
        .collect();
    indexed.sort_by_key(|(index, _)| *index);

    Ok(indexed
        .into_iter()
        .map(|(index, path)| SampledFrame {
            timestamp_ms: index * interval_ms,
            path,
        })
        .collect())
}

/// Parses the index out of a `frames.<n>.jpg` filename.
fn parse_frame_index(filename: &str) -> Option<u64> {
    let rest = filename.strip_prefix("frames.")?;
    let digits = rest.strip_suffix(".jpg")?;
    digits.parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn parses_frame_index_from_filename() {
        assert_eq!(parse_frame_index("frames.0.jpg"), Some(0));
        assert_eq!(parse_frame_index("frames.17.jpg"), Some(17));
        assert_eq!(parse_frame_index("frames.jpg"), None);
        assert_eq!(parse_frame_index("other.3.jpg"), None);
    }

    #[test]
    fn collects_frames_ordered_by_index() {
        let dir = tempfile::tempdir().unwrap();
        for n in [3u64, 0, 1, 2] {
            File::create(dir.path().join(format!("frames.{n}.jpg"))).unwrap();
        }
        File::create(dir.path().join("unrelated.txt")).unwrap();

        let frames = collect_extracted_frames(dir.path(), 1000).unwrap();
        let timestamps: Vec<u64> = frames.iter().map(|f| f.timestamp_ms).collect();
        assert_eq!(timestamps, vec![0, 1000, 2000, 3000]);
    }
}
